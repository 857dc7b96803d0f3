//! Curvature and arcade mixing

use libm::{fabsf, logf};
use motive_core::motion::clamp;
use motive_core::DriveCommand;

/// Default curvature sensitivity
pub const DEFAULT_SENSITIVITY: f32 = 0.5;

/// Left/right wheel outputs, each in [-1, 1], positive is forward
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WheelOutput {
    pub left: f32,
    pub right: f32,
}

impl WheelOutput {
    /// Saturate both sides
    pub fn new(left: f32, right: f32) -> Self {
        Self {
            left: clamp(left),
            right: clamp(right),
        }
    }

    pub const fn stopped() -> Self {
        Self {
            left: 0.0,
            right: 0.0,
        }
    }
}

/// Curvature drive
///
/// Steering is treated as a curve rate: 0 drives straight, larger
/// magnitudes slow the inner wheel exponentially, and ±1 spins it
/// backwards at full magnitude. Positive steering turns right.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CurvatureMixer {
    sensitivity: f32,
}

impl Default for CurvatureMixer {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVITY)
    }
}

impl CurvatureMixer {
    pub const fn new(sensitivity: f32) -> Self {
        Self { sensitivity }
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    /// Mix one command into wheel outputs
    pub fn mix(&self, command: DriveCommand) -> WheelOutput {
        let magnitude = command.magnitude;
        let curve = command.steering;

        if curve == 0.0 {
            return WheelOutput::new(magnitude, magnitude);
        }

        let value = logf(fabsf(curve));
        let mut ratio = (value - self.sensitivity) / (value + self.sensitivity);
        if ratio == 0.0 {
            ratio = f32::EPSILON;
        }

        if curve < 0.0 {
            WheelOutput::new(magnitude / ratio, magnitude)
        } else {
            WheelOutput::new(magnitude, magnitude / ratio)
        }
    }
}

/// Arcade mix: steering added to one side and taken from the other
///
/// Outputs are scaled down together when either side would saturate, so
/// the ratio between the wheels is kept.
pub fn arcade(command: DriveCommand) -> WheelOutput {
    let left = command.magnitude + command.steering;
    let right = command.magnitude - command.steering;

    let peak = fabsf(left).max(fabsf(right));
    if peak > 1.0 {
        WheelOutput::new(left / peak, right / peak)
    } else {
        WheelOutput::new(left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libm::fabsf;

    fn close(a: f32, b: f32) -> bool {
        fabsf(a - b) < 1e-4
    }

    #[test]
    fn test_straight() {
        let out = CurvatureMixer::default().mix(DriveCommand::new(0.6, 0.0));
        assert_eq!(out, WheelOutput::new(0.6, 0.6));
    }

    #[test]
    fn test_right_curve_slows_right_wheel() {
        let out = CurvatureMixer::default().mix(DriveCommand::new(0.8, 0.5));
        assert!(close(out.left, 0.8));
        assert!(out.right > 0.0 && out.right < out.left);
    }

    #[test]
    fn test_left_curve_slows_left_wheel() {
        let out = CurvatureMixer::default().mix(DriveCommand::new(0.8, -0.5));
        assert!(close(out.right, 0.8));
        assert!(out.left > 0.0 && out.left < out.right);
    }

    #[test]
    fn test_full_curve_spins() {
        let out = CurvatureMixer::default().mix(DriveCommand::new(0.5, 1.0));
        assert!(close(out.left, 0.5));
        assert!(close(out.right, -0.5));
    }

    #[test]
    fn test_stopped_stays_stopped() {
        let out = CurvatureMixer::default().mix(DriveCommand::stopped());
        assert_eq!(out, WheelOutput::stopped());
    }

    #[test]
    fn test_reverse_curve() {
        let out = CurvatureMixer::default().mix(DriveCommand::new(-0.8, 0.5));
        assert!(close(out.left, -0.8));
        assert!(out.right < 0.0 && out.right > out.left);
    }

    #[test]
    fn test_arcade() {
        let out = arcade(DriveCommand::new(0.5, 0.25));
        assert!(close(out.left, 0.75));
        assert!(close(out.right, 0.25));

        // Saturation keeps the ratio
        let out = arcade(DriveCommand::new(1.0, 1.0));
        assert!(close(out.left, 1.0));
        assert!(close(out.right, 0.0));

        let out = arcade(DriveCommand::new(0.8, -0.8));
        assert!(close(out.left, 0.0));
        assert!(close(out.right, 1.0));
    }
}
