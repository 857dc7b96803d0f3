//! Discrete PID controller
//!
//! Float implementation of [`PidController`] with integral windup limit,
//! error deadband and output saturation. One instance per control loop;
//! the sequencer owns two (heading hold and turn).

use libm::fabsf;
use motive_core::traits::{PidController, PidGains};

/// PID controller configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidConfig {
    pub gains: PidGains,
    /// Integral windup limit
    ///
    /// Bounds the accumulated integral term so it cannot keep growing while
    /// the output is saturated.
    pub integral_limit: f32,
    /// Output saturation
    pub output_limit: f32,
    /// Errors smaller than this are treated as zero
    pub deadband: f32,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            gains: PidGains::default(),
            integral_limit: 0.5,
            output_limit: 1.0,
            deadband: 0.0,
        }
    }
}

/// Accumulated controller state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct PidState {
    integral: f32,
    /// Error of the previous sample (None right after a reset)
    prev_error: Option<f32>,
}

/// PID controller
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pid {
    config: PidConfig,
    state: PidState,
}

impl Default for Pid {
    fn default() -> Self {
        Self::new(PidConfig::default())
    }
}

impl Pid {
    pub fn new(config: PidConfig) -> Self {
        Self {
            config,
            state: PidState::default(),
        }
    }

    /// Create with default limits and the given gains
    pub fn with_gains(gains: PidGains) -> Self {
        Self::new(PidConfig {
            gains,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &PidConfig {
        &self.config
    }

    /// Current integral term
    pub fn integral(&self) -> f32 {
        self.state.integral
    }
}

impl PidController for Pid {
    /// Replace the gains and clear accumulated state
    fn set_gains(&mut self, gains: PidGains) {
        self.config.gains = gains;
        self.reset();
    }

    fn gains(&self) -> PidGains {
        self.config.gains
    }

    fn update(&mut self, setpoint: f32, measurement: f32) -> f32 {
        let error = setpoint - measurement;
        let error = if fabsf(error) <= self.config.deadband {
            0.0
        } else {
            error
        };
        let gains = self.config.gains;

        let p_term = gains.kp * error;

        self.state.integral = limit(
            self.state.integral + gains.ki * error,
            self.config.integral_limit,
        );

        // No derivative on the first sample after a reset
        let d_term = match self.state.prev_error {
            Some(prev) => gains.kd * (error - prev),
            None => 0.0,
        };
        self.state.prev_error = Some(error);

        limit(p_term + self.state.integral + d_term, self.config.output_limit)
    }

    fn reset(&mut self) {
        self.state = PidState::default();
    }
}

/// Clamp to `[-bound, bound]` without panicking on odd bounds
fn limit(value: f32, bound: f32) -> f32 {
    let bound = fabsf(bound);
    value.max(-bound).min(bound)
}
