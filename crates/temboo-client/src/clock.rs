use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use tracing::warn;

/// A source of the number of seconds elapsed since the device started.
pub trait Uptime {
    /// Returns the elapsed seconds.
    fn uptime_secs(&self) -> u32;
}

/// An [`Uptime`] source measuring the time elapsed since its creation.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicUptime {
    start: Instant,
}

impl MonotonicUptime {
    /// Creates a [`MonotonicUptime`] starting from zero.
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicUptime {
    fn default() -> Self {
        Self::new()
    }
}

impl Uptime for MonotonicUptime {
    fn uptime_secs(&self) -> u32 {
        // Wraps like the 32-bit counters of small devices.
        self.start.elapsed().as_secs() as u32
    }
}

/// Wall clock used to timestamp requests.
///
/// The clock is the uptime source shifted by an offset. The offset starts
/// at zero and is corrected whenever the server reports its own time, so
/// the reported time is meaningful only after the first correction.
/// All arithmetic wraps modulo 2<sup>32</sup>.
#[derive(Debug)]
pub struct Clock<U> {
    uptime: U,
    offset: AtomicU32,
}

impl<U: Uptime> Clock<U> {
    /// Creates a [`Clock`] over an [`Uptime`] source.
    #[must_use]
    #[inline]
    pub const fn new(uptime: U) -> Self {
        Self {
            uptime,
            offset: AtomicU32::new(0),
        }
    }

    /// Returns the current time, in seconds.
    #[must_use]
    pub fn time(&self) -> u32 {
        self.uptime
            .uptime_secs()
            .wrapping_add(self.offset.load(Ordering::Relaxed))
    }

    /// Sets the current time, in seconds.
    pub fn set_time(&self, time: u32) {
        let offset = time.wrapping_sub(self.uptime.uptime_secs());
        let previous = self.offset.swap(offset, Ordering::Relaxed);
        warn!("Clock corrected from offset {previous} to {offset}");
    }
}

impl Clock<MonotonicUptime> {
    /// Creates a [`Clock`] over a [`MonotonicUptime`] source.
    #[must_use]
    #[inline]
    pub fn monotonic() -> Self {
        Self::new(MonotonicUptime::new())
    }
}
