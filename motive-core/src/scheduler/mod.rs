//! Routine scheduling
//!
//! The step model and the sequencer that runs a routine one tick at a time.

pub mod sequencer;
pub mod step;

pub use sequencer::{DriveCommand, ProfileError, StepSequencer, MAX_STEPS};
pub use step::{Latch, Step, StepKind, StepSpec, StepState, TravelDirection};
