//! Drive mixing
//!
//! Turns a [`DriveCommand`](motive_core::DriveCommand) into left/right
//! wheel outputs for a differential drive.

pub mod mixer;

pub use mixer::{arcade, CurvatureMixer, WheelOutput, DEFAULT_SENSITIVITY};
