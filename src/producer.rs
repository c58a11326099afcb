//! Interrupt-context producers.
//!
//! A producer only holds a [`LogAppender`] and a [`FlagSetter`], so the blocking half of the
//! flag is out of reach by construction. `on_falling_edge` is bounded: one pin read, one
//! `fetch_add`, one `fetch_or`. No allocation, no logging.

use embedded_hal::digital::InputPin;

use crate::append_log::LogAppender;
use crate::config::{LOG_CAPACITY, TAG_LEFT, TAG_RIGHT};
use crate::context::Harness;
use crate::event_flag::{FlagSetter, Park, Spin};
use crate::flags::Flags;

/// What a falling-edge interrupt did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeOutcome {
    /// Tag logged and bit set.
    Accepted,
    /// Line already back high: the rising-edge artifact. Nothing done.
    Spurious,
    /// Pin could not be read. Nothing done.
    PinError,
}

/// Edge handler bound to one active-low input.
pub struct ProducerHandler<'a, I, P: Park = Spin, const N: usize = LOG_CAPACITY> {
    pin: I,
    tag: u8,
    bit: Flags,
    log: LogAppender<'a, N>,
    flag: FlagSetter<'a, P>,
}

impl<'a, I: InputPin, P: Park, const N: usize> ProducerHandler<'a, I, P, N> {
    pub fn new(harness: &'a Harness<P, N>, pin: I, tag: u8, bit: Flags) -> Self {
        Self {
            pin,
            tag,
            bit,
            log: harness.irq_log.appender(),
            flag: harness.flag.setter(),
        }
    }

    /// Left input: tag `'L'`, bit `LEFT`.
    pub fn left(harness: &'a Harness<P, N>, pin: I) -> Self {
        Self::new(harness, pin, TAG_LEFT, Flags::LEFT)
    }

    /// Right input: tag `'R'`, bit `RIGHT`.
    pub fn right(harness: &'a Harness<P, N>, pin: I) -> Self {
        Self::new(harness, pin, TAG_RIGHT, Flags::RIGHT)
    }

    /// Interrupt entry point for a falling edge.
    ///
    /// The line is re-sampled first; the input also fires on the rising edge, and those
    /// triggers read high.
    #[inline]
    pub fn on_falling_edge(&mut self) -> EdgeOutcome {
        match self.pin.is_high() {
            Ok(true) => EdgeOutcome::Spurious,
            Err(_) => EdgeOutcome::PinError,
            Ok(false) => {
                // Log before raising the bit so the consumer never sees a bit without its tag.
                self.log.append(self.tag);
                self.flag.set(self.bit);
                EdgeOutcome::Accepted
            }
        }
    }

    #[inline]
    pub fn tag(&self) -> u8 {
        self.tag
    }

    #[inline]
    pub fn bit(&self) -> Flags {
        self.bit
    }

    /// Give the pin back (interrupt unregistered).
    pub fn release(self) -> I {
        self.pin
    }
}
