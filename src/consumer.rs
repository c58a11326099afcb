//! Cooperative-context consumer.
//!
//! Dispatched by the event loop whenever the flag word is non-zero. Owns the flag's single
//! waiter handle for its whole life.

use crate::config::{LOG_CAPACITY, TAG_LEFT, TAG_RIGHT};
use crate::context::Harness;
use crate::event_flag::{FlagWaiter, Park, Spin};
use crate::flags::{Flags, MatchPolicy, WaitError};
use crate::io::{Clock, Rgb, StatusLight};
use crate::mode::Mode;

/// Result of one consumer dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Signal {
    /// Non-empty bit set taken from the flag.
    Delivered(Flags),
    /// The operation succeeded but returned no bits.
    Empty,
    /// The flag reported an error; the light went to alert.
    Failed(WaitError),
}

pub struct ConsumerHandler<'a, P: Park = Spin, const N: usize = LOG_CAPACITY> {
    harness: &'a Harness<P, N>,
    waiter: FlagWaiter<'a, P>,
    wait_timeout_ms: u32,
}

impl<'a, P: Park, const N: usize> ConsumerHandler<'a, P, N> {
    /// Claim the flag's waiter.
    ///
    /// # Panics
    /// If another consumer is alive for this harness.
    pub fn new(harness: &'a Harness<P, N>) -> Self {
        Self {
            harness,
            waiter: harness.flag.waiter(),
            wait_timeout_ms: 0,
        }
    }

    /// Like [`new`](Self::new), but `None` when the waiter is taken.
    pub fn try_new(harness: &'a Harness<P, N>) -> Option<Self> {
        harness.flag.try_waiter().map(|waiter| Self {
            harness,
            waiter,
            wait_timeout_ms: 0,
        })
    }

    /// Timeout used in [`Mode::Wait`]. Defaults to `0`, a poll that never suspends the loop.
    pub fn with_wait_timeout(mut self, ms: u32) -> Self {
        self.wait_timeout_ms = ms;
        self
    }

    /// Handle one flag signal.
    pub fn on_signal<C, L>(&mut self, clock: &C, light: &mut L) -> Signal
    where
        C: Clock + ?Sized,
        L: StatusLight + ?Sized,
    {
        self.harness.counters.record_event();

        let result = match self.harness.mode.load() {
            Mode::Clear => Ok(self.waiter.clear(Flags::ALL)),
            Mode::Wait => self
                .waiter
                .wait(Flags::ALL, MatchPolicy::Any, self.wait_timeout_ms, clock),
        };
        self.settle(result, light)
    }

    /// Count, log and light up one flag result.
    fn settle<L>(&self, result: Result<Flags, WaitError>, light: &mut L) -> Signal
    where
        L: StatusLight + ?Sized,
    {
        let counters = &self.harness.counters;
        let bits = match result {
            Ok(bits) => bits,
            Err(err) => {
                light.set_color(Rgb::ALERT);
                let n = match err {
                    WaitError::Timeout => counters.record_timeout(),
                    WaitError::Unknown => counters.record_unknown(),
                };
                warn!("flag {} error ({} so far)", err, n);
                return Signal::Failed(err);
            }
        };

        if bits.is_empty() {
            counters.record_empty();
            trace!("flag empty");
            return Signal::Empty;
        }

        // PERIODIC has no tag.
        if bits.contains(Flags::LEFT) {
            self.harness.event_log.append(TAG_LEFT);
        }
        if bits.contains(Flags::RIGHT) {
            self.harness.event_log.append(TAG_RIGHT);
        }
        trace!("flag delivered {}", bits.bits());
        Signal::Delivered(bits)
    }
}
