//! Configuration type definitions
//!
//! These types tune the sequencer. They can be authored as TOML (see the
//! drivers crate) or persisted as postcard-serialized binary data.

use crate::motion::{SpeedBand, TrapezoidSettings};
use crate::scheduler::TravelDirection;
use crate::traits::PidGains;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default speed band for moves and curves
pub const DEFAULT_MOVE_SPEED: SpeedBand = SpeedBand { min: 0.5, max: 1.0 };

/// Default speed band for turns
pub const DEFAULT_TURN_SPEED: SpeedBand = SpeedBand {
    min: 0.35,
    max: 0.75,
};

/// Distance/angle quantization of the trapezoid
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct Quantization {
    /// Slices per distance unit for moves and curves
    ///
    /// 48 gives quarter-inch slices when distance is measured in feet.
    pub move_slices_per_unit: f32,
    /// Slices per degree for turns
    pub turn_slices_per_degree: f32,
}

impl Default for Quantization {
    fn default() -> Self {
        Self {
            move_slices_per_unit: 48.0,
            turn_slices_per_degree: 48.0,
        }
    }
}

/// Stall recovery policy
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct StallPolicy {
    /// Evaluations between checks (0 disables)
    pub check_interval: u8,
    /// Fraction of the speed band added to the minimum speed per stall
    pub ratchet: f32,
}

impl Default for StallPolicy {
    fn default() -> Self {
        Self {
            check_interval: 5,
            ratchet: 0.1,
        }
    }
}

/// Sequencer configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct ProfileConfig {
    /// Speed band copied into moves and curves when appended
    pub move_speed: SpeedBand,
    /// Speed band copied into turns when appended
    pub turn_speed: SpeedBand,
    /// Sign of the drive magnitude during turns
    pub turn_direction: TravelDirection,
    /// Chain consecutive steps without bleeding off speed
    pub continuous: bool,
    pub quantization: Quantization,
    pub stall: StallPolicy,
    /// Heading hold during moves
    pub steer_gains: PidGains,
    /// Heading error correction during turns
    pub turn_gains: PidGains,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            move_speed: DEFAULT_MOVE_SPEED,
            turn_speed: DEFAULT_TURN_SPEED,
            turn_direction: TravelDirection::Forward,
            continuous: false,
            quantization: Quantization::default(),
            stall: StallPolicy::default(),
            steer_gains: PidGains::new(0.1, 0.0, 0.0),
            turn_gains: PidGains::new(0.02, 0.0, 0.0),
        }
    }
}

impl ProfileConfig {
    /// Trapezoid settings for moves and curves
    pub fn move_settings(&self) -> TrapezoidSettings {
        TrapezoidSettings {
            slices_per_unit: self.quantization.move_slices_per_unit,
            stall_check_interval: self.stall.check_interval,
            stall_ratchet: self.stall.ratchet,
        }
    }

    /// Trapezoid settings for turns
    pub fn turn_settings(&self) -> TrapezoidSettings {
        TrapezoidSettings {
            slices_per_unit: self.quantization.turn_slices_per_degree,
            stall_check_interval: self.stall.check_interval,
            stall_ratchet: self.stall.ratchet,
        }
    }
}
