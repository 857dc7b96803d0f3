//! Concrete implementations for the Motive motion-profile engine
//!
//! This crate provides implementations of the traits defined in
//! motive-core plus the pieces around the sequencer:
//!
//! - Discrete PID controller
//! - Drive mixing (curvature and arcade)
//! - Clock sources (manual, std, embassy-time)
//! - TOML routine and tuning loader

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod clock;
#[cfg(feature = "toml")]
pub mod config;
pub mod drive;
pub mod pid;

pub use clock::ManualClock;
#[cfg(feature = "std")]
pub use clock::StdClock;
pub use drive::{CurvatureMixer, WheelOutput};
pub use pid::{Pid, PidConfig};
