//! Monotonic diagnostic counters.

use crate::atomic::{AtomicU32, Ordering};

/// Consumer outcome counters. Only ever incremented; reset by restart.
pub struct Counters {
    timeouts: AtomicU32,
    empty: AtomicU32,
    unknown: AtomicU32,
    events: AtomicU32,
}

impl Counters {
    pub const fn new() -> Self {
        Self {
            timeouts: AtomicU32::new(0),
            empty: AtomicU32::new(0),
            unknown: AtomicU32::new(0),
            events: AtomicU32::new(0),
        }
    }

    #[inline]
    pub fn record_timeout(&self) -> u32 {
        self.timeouts.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    #[inline]
    pub fn record_empty(&self) -> u32 {
        self.empty.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    #[inline]
    pub fn record_unknown(&self) -> u32 {
        self.unknown.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Count one consumer dispatch.
    #[inline]
    pub fn record_event(&self) -> u32 {
        self.events.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    #[inline]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            timeouts: self.timeouts.load(Ordering::Relaxed),
            empty: self.empty.load(Ordering::Relaxed),
            unknown: self.unknown.load(Ordering::Relaxed),
            events: self.events.load(Ordering::Relaxed),
        }
    }
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter values at a point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CounterSnapshot {
    pub timeouts: u32,
    pub empty: u32,
    pub unknown: u32,
    pub events: u32,
}
