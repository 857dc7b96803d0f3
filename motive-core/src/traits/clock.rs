//! Monotonic time source

/// Monotonic microsecond clock
///
/// Only differences between readings are meaningful. Pause steps measure
/// their duration against this clock.
pub trait Clock {
    /// Current time in microseconds
    fn now_us(&self) -> u64;

    /// Current time in whole milliseconds
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}
