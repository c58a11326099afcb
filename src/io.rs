//! Collaborator seams: time source, status light, status display.
//!
//! The harness only calls into these; rendering and LED driving live outside the crate.
//! Digital inputs use [`embedded_hal::digital::InputPin`] directly.

use core::fmt;

use crate::append_log::AppendLog;
use crate::counters::CounterSnapshot;
use crate::mode::Mode;

/// Monotonic millisecond time source.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// `std::time::Instant` based clock, zero at construction.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// 24-bit color for the tri-color status light.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::from_u32(0x000000);
    pub const ALERT: Rgb = Rgb::from_u32(0xff0000);

    /// From `0xRRGGBB`; the top byte is ignored.
    pub const fn from_u32(color: u32) -> Self {
        Self {
            r: (color >> 16) as u8,
            g: (color >> 8) as u8,
            b: color as u8,
        }
    }

    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// Tri-color status output.
pub trait StatusLight {
    fn set_color(&mut self, color: Rgb);
}

/// Receives the status payload once per controller tick.
pub trait StatusDisplay {
    fn refresh<const N: usize>(&mut self, view: &StatusView<'_, N>);
}

/// Everything the display shows, borrowed from the live harness.
///
/// `Display` renders it as five text lines.
pub struct StatusView<'a, const N: usize> {
    pub irq_log: &'a AppendLog<N>,
    pub event_log: &'a AppendLog<N>,
    pub mode: Mode,
    pub periodic: bool,
    pub counters: CounterSnapshot,
}

pub(crate) fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

impl<const N: usize> fmt::Display for StatusView<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IRQ: {}", self.irq_log)?;
        writeln!(f, "EVT: {}", self.event_log)?;
        writeln!(f, "unset method: {}", self.mode)?;
        writeln!(f, "dummy evt timer: {}", yes_no(self.periodic))?;
        write!(
            f,
            "err: {} {} {} evt cnt: {}",
            self.counters.timeouts, self.counters.empty, self.counters.unknown, self.counters.events
        )
    }
}
