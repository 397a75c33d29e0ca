//! Time sources for the non-blocking step generator.

/// Something which reports elapsed time in microseconds.
///
/// Must be monotonic; wrap-around is tolerated because elapsed intervals are
/// computed with wrapping subtraction.
pub trait Clock {
    /// Microseconds since a clock-specific reference point.
    fn now_us(&self) -> u64;
}

impl<F> Clock for F
where
    F: Fn() -> u64,
{
    fn now_us(&self) -> u64 {
        self()
    }
}

/// A monotonic clock backed by the operating system.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StdClock {
    created_at: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Create a clock whose reference point is now.
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self {
            created_at: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_us(&self) -> u64 {
        self.created_at.elapsed().as_micros() as u64
    }
}
