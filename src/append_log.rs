//! Lock-free bounded append-only character log.
//!
//! # Overview
//! - Any number of concurrent appenders (interrupt handlers and the cooperative consumer).
//! - Each append claims a unique slot with one atomic `fetch_add` on the cursor.
//! - No write ever targets an index `>= N`. Once the cursor reaches `N` the content is frozen:
//!   further claims are clamped back to `N` and counted in `dropped()`.
//! - No removal and no reset. Overflow is silent and non-fatal.
//!
//! # Memory ordering
//! The claim itself is `Relaxed`: disjointness of slots comes from the RMW, not from ordering.
//! The byte is stored with `Release`; readers load with `Acquire` and treat a zero byte as the
//! end of readable text, so a claimed-but-unwritten slot is never shown as garbage.

use core::fmt;

use crate::atomic::{AtomicU32, AtomicU8, Ordering};

fn atomic_u8_array<const N: usize>(init: u8) -> [AtomicU8; N] {
    core::array::from_fn(|_| AtomicU8::new(init))
}

/// Fixed-capacity append-only log of non-zero bytes.
pub struct AppendLog<const N: usize> {
    cursor: AtomicU32,
    dropped: AtomicU32,
    slots: [AtomicU8; N],
}

impl<const N: usize> AppendLog<N> {
    pub fn new() -> Self {
        assert!(N > 0 && N < u32::MAX as usize);
        Self {
            cursor: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
            slots: atomic_u8_array::<N>(0),
        }
    }

    /// Create an append-only handle. Any number may be active.
    #[inline]
    pub fn appender(&self) -> LogAppender<'_, N> {
        LogAppender { log: self }
    }

    /// Append one byte.
    ///
    /// Returns `false` when the log is already full and the byte was discarded. A zero byte is
    /// the terminator: it is rejected before claiming a slot and counted in `dropped()`.
    #[inline]
    pub fn append(&self, byte: u8) -> bool {
        if byte == 0 {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed);
        if idx as usize >= N {
            self.cursor.fetch_min(N as u32, Ordering::Relaxed);
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        self.slots[idx as usize].store(byte, Ordering::Release);
        true
    }

    /// Number of claimed slots (`<= N`).
    #[inline]
    pub fn len(&self) -> usize {
        (self.cursor.load(Ordering::Acquire) as usize).min(N)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    /// Appends discarded since creation.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Iterate the readable prefix (stops at the first unwritten slot).
    pub fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.slots[..self.len()]
            .iter()
            .map(|slot| slot.load(Ordering::Acquire))
            .take_while(|&b| b != 0)
    }

    /// Copy the readable prefix into `buf`, returning how many bytes were written.
    pub fn copy_to(&self, buf: &mut [u8]) -> usize {
        let mut written = 0;
        for (dst, b) in buf.iter_mut().zip(self.bytes()) {
            *dst = b;
            written += 1;
        }
        written
    }
}

impl<const N: usize> Default for AppendLog<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Display for AppendLog<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;
        for b in self.bytes() {
            f.write_char(char::from(b))?;
        }
        Ok(())
    }
}

impl<const N: usize> fmt::Debug for AppendLog<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppendLog")
            .field("len", &self.len())
            .field("capacity", &N)
            .field("dropped", &self.dropped())
            .finish()
    }
}

/// Append-only view of an [`AppendLog`]; the only access interrupt code gets.
pub struct LogAppender<'a, const N: usize> {
    log: &'a AppendLog<N>,
}

impl<const N: usize> Clone for LogAppender<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<const N: usize> Copy for LogAppender<'_, N> {}

impl<'a, const N: usize> LogAppender<'a, N> {
    #[inline]
    pub fn append(&self, byte: u8) -> bool {
        self.log.append(byte)
    }
}
