//! Monotonic time source

/// Millisecond clock used by drivers that model motion over time
///
/// The counter may wrap; compare instants with `wrapping_sub`.
pub trait Clock {
    /// Milliseconds since an arbitrary epoch
    fn now_ms(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}
