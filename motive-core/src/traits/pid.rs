//! Feedback controller interface
//!
//! The sequencer owns two controllers: one holds the heading during
//! straight and curved travel, the other drives the heading error of a turn
//! to zero. Either can be any implementation of [`PidController`].

use libm::fabsf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Proportional/integral/derivative gains
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

impl PidGains {
    /// Create a gain set
    pub const fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self { kp, ki, kd }
    }

    /// Same gains with the proportional term forced to the sign of `sign`
    pub fn signed_kp(self, sign: f32) -> Self {
        let kp = if sign < 0.0 {
            -fabsf(self.kp)
        } else {
            fabsf(self.kp)
        };
        Self { kp, ..self }
    }
}

/// A feedback controller
pub trait PidController {
    /// Replace the gains
    fn set_gains(&mut self, gains: PidGains);

    /// Current gains
    fn gains(&self) -> PidGains;

    /// Compute the control output for one sample
    fn update(&mut self, setpoint: f32, measurement: f32) -> f32;

    /// Clear accumulated state (integral, previous error)
    fn reset(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_kp() {
        let gains = PidGains::new(0.2, 0.01, 0.0);
        assert_eq!(gains.signed_kp(-1.0).kp, -0.2);
        assert_eq!(gains.signed_kp(1.0).kp, 0.2);
        assert_eq!(PidGains::new(-0.2, 0.0, 0.0).signed_kp(1.0).kp, 0.2);
        // Other terms untouched
        assert_eq!(gains.signed_kp(-1.0).ki, 0.01);
    }
}
