//! Flag bits, match policy and wait errors.
//!
//! The live flag word only ever carries bits from [`Flags::ALL`]. Errors are reported through
//! [`WaitError`] and never folded into the data range.

use core::fmt;

bitflags::bitflags! {
    /// Signal bits carried by an [`EventFlag`](crate::EventFlag).
    ///
    /// Combine with bitwise OR: `Flags::LEFT | Flags::RIGHT`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flags: u32 {
        /// Left producer input.
        const LEFT = 1 << 0;
        /// Right producer input.
        const RIGHT = 1 << 1;
        /// Synthetic bit raised by the controller tick.
        const PERIODIC = 1 << 2;
        const ALL = Self::LEFT.bits() | Self::RIGHT.bits() | Self::PERIODIC.bits();
    }
}

impl Flags {
    /// All-ones word reserved by the flag layout.
    ///
    /// Not a member of the set: nothing sets, waits on, or interprets it.
    pub const RESERVED_RAW: u32 = u32::MAX;

    /// Keep only defined bits of a raw word.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self::from_bits_truncate(raw)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Flags {
    fn format(&self, f: defmt::Formatter<'_>) {
        defmt::write!(f, "Flags({=u32:#x})", self.bits());
    }
}

/// Wait forever (no deadline).
pub const WAIT_FOREVER: u32 = u32::MAX;

/// How a wait decides the requested bits are satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MatchPolicy {
    /// At least one requested bit is set.
    #[default]
    Any,
    /// Every requested bit is set.
    All,
}

/// Why a wait returned without bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitError {
    /// The window elapsed with nothing satisfied. A zero-timeout poll on an empty word lands here.
    Timeout,
    /// Any other non-nominal outcome (e.g. an empty request mask).
    Unknown,
}

impl WaitError {
    pub fn as_str(self) -> &'static str {
        match self {
            WaitError::Timeout => "timeout",
            WaitError::Unknown => "unknown",
        }
    }
}

impl fmt::Display for WaitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
