//! Interfaces consumed by the sequencer
//!
//! The sequencer never talks to hardware or to a concrete control law.
//! Feedback controllers and time sources are injected through these traits.

pub mod clock;
pub mod pid;

pub use clock::Clock;
pub use pid::{PidController, PidGains};
