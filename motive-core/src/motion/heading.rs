//! Heading normalization
//!
//! All angles are in degrees. A normalized heading lies in `[-180, 180)`.
//! Negative errors steer left, positive errors steer right.

use libm::fmodf;

/// Half a revolution in degrees
pub const HALF_TURN: f32 = 180.0;

/// One full revolution in degrees
pub const FULL_TURN: f32 = 360.0;

/// Map a heading into `[-180, 180)` with a single ±360 correction
///
/// Only valid for inputs in `[-540, 540)`. Raw sensor yaw that can wind up
/// beyond that range must go through [`wrap`] first.
pub fn normalize(heading: f32) -> f32 {
    if heading >= HALF_TURN {
        heading - FULL_TURN
    } else if heading < -HALF_TURN {
        heading + FULL_TURN
    } else {
        heading
    }
}

/// Map any finite angle into `[-180, 180)`
pub fn wrap(heading: f32) -> f32 {
    let mut r = fmodf(heading + HALF_TURN, FULL_TURN);
    if r < 0.0 {
        r += FULL_TURN;
    }
    // r + 360 can round up to exactly 360 for tiny negative remainders
    normalize(r - HALF_TURN)
}

/// Signed shortest angular path from `from` to `to`
///
/// Equal to `normalize(normalize(to) - normalize(from))` on the domain of
/// [`normalize`], and total on every finite input.
pub fn normalized_error(from: f32, to: f32) -> f32 {
    normalize(wrap(to) - wrap(from))
}

/// Zero reference for a gyro whose yaw does not start at zero
///
/// Latch the current yaw with [`HeadingReference::zero`]; afterwards
/// [`HeadingReference::heading`] reports yaw relative to that point in
/// `[0, 360)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeadingReference {
    offset: f32,
}

impl HeadingReference {
    /// Create a reference with no offset
    pub const fn new() -> Self {
        Self { offset: 0.0 }
    }

    /// Make the given raw yaw the new zero
    pub fn zero(&mut self, raw_yaw: f32) {
        self.offset = wrap(raw_yaw);
    }

    /// Current offset in `[-180, 180)`
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Heading relative to the zero point, in `[0, 360)`
    pub fn heading(&self, raw_yaw: f32) -> f32 {
        let mut relative = wrap(raw_yaw) - self.offset;
        if relative < 0.0 {
            relative += FULL_TURN;
        }
        if relative >= FULL_TURN {
            relative -= FULL_TURN;
        }
        relative
    }
}
