//! Consumer mode state and timestamp debounce.

use core::fmt;

use crate::atomic::{AtomicBool, AtomicU8, Ordering};

/// How the consumer takes bits out of the flag word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Mode {
    /// Read-and-clear all bits.
    Clear = 0,
    /// Zero-timeout wait on any bit.
    #[default]
    Wait = 1,
}

impl Mode {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Mode::Clear,
            _ => Mode::Wait,
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Mode::Clear => "clear",
            Mode::Wait => "wait",
        }
    }

    #[inline]
    pub fn toggled(self) -> Self {
        match self {
            Mode::Clear => Mode::Wait,
            Mode::Wait => Mode::Clear,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Atomic [`Mode`] cell.
pub struct AtomicMode(AtomicU8);

impl AtomicMode {
    pub const fn new(mode: Mode) -> Self {
        Self(AtomicU8::new(mode as u8))
    }

    #[inline]
    pub fn load(&self) -> Mode {
        Mode::from_u8(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub fn store(&self, mode: Mode) {
        self.0.store(mode as u8, Ordering::Release);
    }

    /// Flip and return the new mode. Writers are cooperative-only, so load/store is enough.
    #[inline]
    pub fn toggle(&self) -> Mode {
        let next = self.load().toggled();
        self.store(next);
        next
    }
}

impl Default for AtomicMode {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}

/// Atomic boolean switch, flipped from the cooperative context.
pub struct AtomicSwitch(AtomicBool);

impl AtomicSwitch {
    pub const fn new(on: bool) -> Self {
        Self(AtomicBool::new(on))
    }

    #[inline]
    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self, on: bool) {
        self.0.store(on, Ordering::Release);
    }

    #[inline]
    pub fn toggle(&self) -> bool {
        let next = !self.get();
        self.set(next);
        next
    }
}

/// Accepts at most one press per window, measured from the last accepted press.
///
/// Independent of how often it is sampled.
#[derive(Clone, Copy, Debug)]
pub struct Debouncer {
    window_ms: u64,
    last_accept_ms: Option<u64>,
}

impl Debouncer {
    pub const fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last_accept_ms: None,
        }
    }

    /// Feed one sample. Returns `true` if this press is accepted.
    pub fn press(&mut self, pressed: bool, now_ms: u64) -> bool {
        if !pressed {
            return false;
        }
        let accept = match self.last_accept_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.window_ms,
        };
        if accept {
            self.last_accept_ms = Some(now_ms);
        }
        accept
    }

    #[inline]
    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }
}
