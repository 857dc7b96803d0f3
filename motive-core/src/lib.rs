//! Board-agnostic core of the motion-profile engine
//!
//! This crate turns an authored routine of discrete motion steps into a
//! per-tick stream of drive commands. It contains everything that does not
//! depend on specific hardware:
//!
//! - Heading normalization and output saturation
//! - Distance-quantized trapezoidal speed planning with stall recovery
//! - The step model and the step sequencer
//! - PID and clock traits consumed by the sequencer
//! - Configuration type definitions
//!
//! No allocation, no blocking: the sequencer is driven by calling
//! [`StepSequencer::tick`] once per control cycle.

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod motion;
pub mod scheduler;
pub mod traits;

pub use scheduler::{
    DriveCommand, ProfileError, StepSequencer, StepSpec, TravelDirection, MAX_STEPS,
};
