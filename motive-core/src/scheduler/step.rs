//! Step model
//!
//! A routine is an ordered list of [`Step`]s. Each step carries its own
//! state machine: it latches its start conditions the first time it is
//! ticked and finishes exactly once.

use crate::motion::{SpeedBand, Trapezoid};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction of travel
///
/// `Forward` produces a positive drive magnitude, `Reverse` a negative one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TravelDirection {
    #[default]
    Forward,
    Reverse,
}

impl TravelDirection {
    /// +1.0 for forward, -1.0 for reverse
    pub const fn sign(self) -> f32 {
        match self {
            Self::Forward => 1.0,
            Self::Reverse => -1.0,
        }
    }
}

/// What a step does, with the speeds it was appended with
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepKind {
    /// Straight travel holding the start heading
    Move {
        direction: TravelDirection,
        distance: f32,
        speed: SpeedBand,
    },
    /// Rotate to an absolute heading (degrees)
    Turn {
        heading: f32,
        speed: SpeedBand,
        /// Sign applied to the drive magnitude while turning
        direction: TravelDirection,
    },
    /// Hold still
    Pause { duration_ms: u32 },
    /// Travel with a fixed steering ratio
    Curve {
        direction: TravelDirection,
        distance: f32,
        ratio: f32,
        speed: SpeedBand,
    },
}

impl StepKind {
    /// Short name for logs
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::Turn { .. } => "turn",
            Self::Pause { .. } => "pause",
            Self::Curve { .. } => "curve",
        }
    }

    /// Distance, heading, or duration this step aims for
    pub fn target(&self) -> f32 {
        match *self {
            Self::Move { distance, .. } | Self::Curve { distance, .. } => distance,
            Self::Turn { heading, .. } => heading,
            Self::Pause { duration_ms } => duration_ms as f32,
        }
    }

    /// Direction of a move or curve
    pub const fn travel_direction(&self) -> Option<TravelDirection> {
        match *self {
            Self::Move { direction, .. } | Self::Curve { direction, .. } => Some(direction),
            _ => None,
        }
    }

    /// Sign of the drive magnitude this step produces
    pub const fn direction(&self) -> TravelDirection {
        match *self {
            Self::Move { direction, .. }
            | Self::Curve { direction, .. }
            | Self::Turn { direction, .. } => direction,
            Self::Pause { .. } => TravelDirection::Forward,
        }
    }

    /// Speed this step offers a neighbour travelling in `active`
    ///
    /// A move or curve the other way offers zero so the neighbour ramps
    /// all the way down. Pauses do not take part in chaining.
    pub fn chaining_speed(&self, active: TravelDirection) -> Option<f32> {
        match *self {
            Self::Move {
                direction, speed, ..
            }
            | Self::Curve {
                direction, speed, ..
            } => {
                if direction == active {
                    Some(speed.max)
                } else {
                    Some(0.0)
                }
            }
            Self::Turn { speed, .. } => Some(speed.max),
            Self::Pause { .. } => None,
        }
    }
}

/// Start conditions latched on a step's first tick
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Latch {
    Travel {
        /// Cumulative distance when the step started
        start_distance: f32,
        /// Heading to hold (moves only)
        hold_heading: f32,
        trapezoid: Trapezoid,
    },
    Turn {
        /// Signed heading error at the start; fixes the steering sign
        initial_error: f32,
        trapezoid: Trapezoid,
    },
    Pause { started_us: u64 },
}

impl Latch {
    /// Trapezoid scratch, if this kind of step uses one
    pub fn trapezoid(&self) -> Option<&Trapezoid> {
        match self {
            Self::Travel { trapezoid, .. } | Self::Turn { trapezoid, .. } => Some(trapezoid),
            Self::Pause { .. } => None,
        }
    }
}

/// Per-step state machine
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepState {
    /// Not started yet
    Pending,
    /// Running with latched start conditions
    Active(Latch),
    /// Finished
    Done,
}

/// One entry of a routine
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Step {
    kind: StepKind,
    state: StepState,
}

impl Step {
    /// Create a pending step
    pub const fn new(kind: StepKind) -> Self {
        Self {
            kind,
            state: StepState::Pending,
        }
    }

    pub fn kind(&self) -> &StepKind {
        &self.kind
    }

    pub fn state(&self) -> &StepState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, StepState::Pending)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, StepState::Active(_))
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, StepState::Done)
    }

    /// Pending -> Active
    ///
    /// Returns false (and changes nothing) if the step already started.
    pub fn activate(&mut self, latch: Latch) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.state = StepState::Active(latch);
        true
    }

    /// Active -> Done
    ///
    /// Returns false if the step was not active, so finishing happens once.
    pub fn finish(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.state = StepState::Done;
        true
    }

    /// Latched start conditions of an active step
    pub fn latch(&self) -> Option<&Latch> {
        match &self.state {
            StepState::Active(latch) => Some(latch),
            _ => None,
        }
    }

    pub fn latch_mut(&mut self) -> Option<&mut Latch> {
        match &mut self.state {
            StepState::Active(latch) => Some(latch),
            _ => None,
        }
    }
}

/// Authored step, before speeds are filled in from the configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepSpec {
    Move {
        direction: TravelDirection,
        distance: f32,
    },
    Turn {
        heading: f32,
    },
    Pause {
        duration_ms: u32,
    },
    Curve {
        direction: TravelDirection,
        distance: f32,
        ratio: f32,
    },
}
