//! Configuration types
//!
//! Sequencer tuning, optionally persisted as postcard binary data.

pub mod tuning;
pub mod types;

pub use tuning::*;
pub use types::*;
