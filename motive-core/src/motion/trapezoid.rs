//! Distance-quantized trapezoidal speed profile
//!
//! The travel of one step is cut into equal slices. The slice the vehicle
//! currently sits in decides the commanded speed:
//!
//! - the first quarter ramps from the minimum up to the maximum speed,
//! - the middle half cruises at the maximum speed,
//! - the last quarter ramps back down toward the minimum speed.
//!
//! Speed is a function of distance travelled, not of time, so a vehicle
//! that is held up for a moment simply gets the speed for wherever it is
//! once it moves again. If it does not move at all the minimum speed is
//! ratcheted up until it does.
//!
//! All speeds here are non-negative magnitudes; the caller applies the
//! travel direction.

use libm::{fabsf, roundf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default quantization: quarter-inch slices when distance is in feet
pub const DEFAULT_SLICES_PER_UNIT: f32 = 48.0;

/// Default number of evaluations between stall checks
pub const DEFAULT_STALL_CHECK_INTERVAL: u8 = 5;

/// Default fraction of the speed band added to the minimum speed on a stall
pub const DEFAULT_STALL_RATCHET: f32 = 0.1;

/// Minimum/maximum speed magnitudes for one step
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct SpeedBand {
    /// Speed at the start and end of the ramp
    pub min: f32,
    /// Cruise speed
    pub max: f32,
}

impl SpeedBand {
    /// Create a band from two magnitudes (signs are discarded)
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            min: fabsf(min),
            max: fabsf(max),
        }
    }
}

/// Quantization and stall-recovery policy
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrapezoidSettings {
    /// Number of slices per unit of target magnitude
    pub slices_per_unit: f32,
    /// Evaluations between stall checks (0 disables stall recovery)
    pub stall_check_interval: u8,
    /// Fraction of the remaining band added to the minimum speed on a stall
    pub stall_ratchet: f32,
}

impl Default for TrapezoidSettings {
    fn default() -> Self {
        Self {
            slices_per_unit: DEFAULT_SLICES_PER_UNIT,
            stall_check_interval: DEFAULT_STALL_CHECK_INTERVAL,
            stall_ratchet: DEFAULT_STALL_RATCHET,
        }
    }
}

/// Speeds of the neighbouring steps used to avoid bleeding off speed
/// between chained steps
///
/// `None` means the neighbour does not take part in chaining (first or
/// last step, a pause, or chaining disabled).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Chaining {
    /// Floor for the acceleration ramp
    pub prev_speed: Option<f32>,
    /// Target for the deceleration ramp
    pub next_speed: Option<f32>,
}

impl Chaining {
    /// No chaining on either side
    pub const fn none() -> Self {
        Self {
            prev_speed: None,
            next_speed: None,
        }
    }
}

/// Profile zone of the latest evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Zone {
    /// First quarter, ramping up
    Accelerating,
    /// Middle half, at maximum speed
    Cruising,
    /// Last quarter, ramping down
    Decelerating,
    /// All slices traversed
    Done,
}

/// Result of one evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrapezoidOutput {
    /// Speed magnitude (0 once done)
    pub speed: f32,
    /// Zone the speed was taken from
    pub zone: Zone,
}

impl TrapezoidOutput {
    const fn done() -> Self {
        Self {
            speed: 0.0,
            zone: Zone::Done,
        }
    }

    /// Check if the profile has finished
    pub fn is_done(&self) -> bool {
        self.zone == Zone::Done
    }
}

/// Trapezoid scratch for one active step
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Trapezoid {
    /// Absolute distance (or angle) to cover
    target: f32,
    /// Number of quantization slices over the target
    step_count: f32,
    /// Last slice of the acceleration zone
    first_corner: f32,
    /// First slice of the deceleration zone
    second_corner: f32,
    /// Size of one slice
    slice: f32,
    /// Speed gained per unit travelled in the ramps
    accel: f32,
    /// Adaptive minimum speed (raised on stalls)
    min_speed: f32,
    /// Configured minimum speed
    base_min_speed: f32,
    /// Cruise speed
    max_speed: f32,
    /// Neighbour speeds
    chaining: Chaining,
    /// Stall policy
    stall_check_interval: u8,
    stall_ratchet: f32,
    /// Evaluations since the last stall check
    stall_ticks: u8,
    /// Clock reading when the profile was configured
    started_us: u64,
    /// Zero or non-finite target: nothing to do
    degenerate: bool,
    /// Terminal flag
    done: bool,
}

impl Trapezoid {
    /// Configure a profile over `target` (sign ignored)
    ///
    /// `now_us` is only recorded so the motion time can be reported when
    /// the profile completes.
    pub fn configure(
        target: f32,
        speed: SpeedBand,
        chaining: Chaining,
        settings: TrapezoidSettings,
        now_us: u64,
    ) -> Self {
        let target = fabsf(target);
        let step_count = target * fabsf(settings.slices_per_unit);
        let degenerate = !target.is_finite() || !(step_count > 0.0) || !step_count.is_finite();

        let (first_corner, second_corner, slice, accel) = if degenerate {
            (0.0, 0.0, 1.0, 0.0)
        } else {
            let first_corner = step_count / 4.0;
            let slice = target / step_count;
            let accel = (speed.max - speed.min) / (first_corner * slice);
            (first_corner, first_corner * 3.0, slice, accel)
        };

        Self {
            target,
            step_count,
            first_corner,
            second_corner,
            slice,
            accel,
            min_speed: speed.min,
            base_min_speed: speed.min,
            max_speed: speed.max,
            chaining,
            stall_check_interval: settings.stall_check_interval,
            stall_ratchet: settings.stall_ratchet,
            stall_ticks: 0,
            started_us: now_us,
            degenerate,
            done: false,
        }
    }

    /// Speed for the given distance travelled since the step started
    ///
    /// Once the last slice (or the target itself) is reached the profile
    /// reports [`Zone::Done`] with zero speed and stays done.
    pub fn evaluate(&mut self, distance: f32) -> TrapezoidOutput {
        if self.done {
            return TrapezoidOutput::done();
        }

        let travelled = fabsf(distance);
        let step = fabsf(roundf(travelled / self.slice));

        if self.degenerate || !(step < self.step_count) || travelled >= self.target {
            self.done = true;
            return TrapezoidOutput::done();
        }

        if step <= self.first_corner {
            let mut speed = self.limit_to_max(self.accel * travelled + self.min_speed);
            if let Some(prev) = self.chaining.prev_speed {
                if speed < prev {
                    speed = prev;
                }
            }
            self.check_stall(travelled);
            TrapezoidOutput {
                speed,
                zone: Zone::Accelerating,
            }
        } else if step < self.second_corner {
            TrapezoidOutput {
                speed: self.max_speed,
                zone: Zone::Cruising,
            }
        } else {
            let mut speed =
                self.limit_to_max(self.accel * (self.target - travelled) + self.min_speed);
            if let Some(next) = self.chaining.next_speed {
                if self.max_speed >= next {
                    if speed < next {
                        speed = next;
                    }
                } else if speed > next {
                    speed = next;
                }
            }
            TrapezoidOutput {
                speed,
                zone: Zone::Decelerating,
            }
        }
    }

    /// Raise the minimum speed if we have not left the first slice
    fn check_stall(&mut self, travelled: f32) {
        if self.stall_check_interval == 0 {
            return;
        }

        self.stall_ticks = self.stall_ticks.saturating_add(1);
        if self.stall_ticks < self.stall_check_interval {
            return;
        }
        self.stall_ticks = 0;

        if travelled < self.slice {
            let bump = (self.max_speed - self.min_speed) * self.stall_ratchet;
            self.min_speed = self.limit_to_max(self.min_speed + bump);
            debug!("stall: min speed raised to {}", self.min_speed);
        }
    }

    /// Keep a ramp speed on the minimum's side of the maximum speed
    fn limit_to_max(&self, speed: f32) -> f32 {
        if self.base_min_speed <= self.max_speed {
            speed.min(self.max_speed)
        } else {
            speed.max(self.max_speed)
        }
    }

    /// Absolute target magnitude
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Number of quantization slices
    pub fn step_count(&self) -> f32 {
        self.step_count
    }

    /// Size of one slice
    pub fn slice(&self) -> f32 {
        self.slice
    }

    /// Current (possibly ratcheted) minimum speed
    pub fn min_speed(&self) -> f32 {
        self.min_speed
    }

    /// Cruise speed
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Neighbour speeds this profile chains with
    pub fn chaining(&self) -> Chaining {
        self.chaining
    }

    /// Check if the profile has finished
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Milliseconds since the profile was configured
    pub fn elapsed_ms(&self, now_us: u64) -> u64 {
        now_us.saturating_sub(self.started_us) / 1000
    }
}
