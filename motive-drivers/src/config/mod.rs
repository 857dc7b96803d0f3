//! Routine files
//!
//! A routine file is a TOML document with an optional `[profile]` table
//! (any [`ProfileConfig`](motive_core::config::ProfileConfig) field, unknown
//! keys are rejected) and an ordered `[[step]]` array:
//!
//! ```toml
//! [profile]
//! continuous = true
//! move_speed = { min = 0.4, max = 0.9 }
//!
//! [[step]]
//! kind = "move"
//! direction = "forward"
//! distance = 3.0
//!
//! [[step]]
//! kind = "turn"
//! heading = 90.0
//!
//! [[step]]
//! kind = "pause"
//! duration_ms = 3000
//! ```

pub mod loader;

pub use loader::{parse_routine, read_routine, LoadError, Routine};
