//! Motion math
//!
//! Heading normalization, output saturation and the distance-quantized
//! trapezoidal speed profile.

pub mod clamp;
pub mod heading;
pub mod trapezoid;

pub use clamp::clamp;
pub use heading::{normalize, normalized_error, wrap, HeadingReference};
pub use trapezoid::{Chaining, SpeedBand, Trapezoid, TrapezoidOutput, TrapezoidSettings, Zone};
