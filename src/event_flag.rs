//! Lock-free event flag: one atomic word plus a wake channel.
//!
//! # Overview
//! - Many setters, one waiter. Setters only OR bits in and never block, so they are safe in
//!   interrupt context.
//! - The waiter is the only context that clears bits (`clear`, `wait`, `poll`). Because nobody
//!   else clears, "load, pick satisfied bits, `fetch_and` them away" is atomic with respect to
//!   every other party without a CAS loop.
//! - The live word never holds bits outside [`Flags::ALL`]; `set` masks its input.
//!
//! # Contexts
//! [`FlagSetter`] is the interrupt-side handle: it can `set` and read, nothing else.
//! [`FlagWaiter`] is the cooperative-side handle and the only way to reach `clear`/`wait`.
//! There is exactly one waiter at a time; a second claim fails.
//!
//! # Memory ordering
//! `set` is `Release` so data written before raising a bit (e.g. a log byte) is visible to the
//! waiter that observes the bit with `Acquire`.

use crate::atomic::{AtomicBool, AtomicU32, Ordering};
use crate::flags::{Flags, MatchPolicy, WAIT_FOREVER, WaitError};
use crate::io::Clock;

/// Wake channel between setters and the single waiter.
///
/// `unpark` runs in whatever context called `set`, including interrupts: it must not block
/// or allocate.
pub trait Park: Sync {
    /// Called by the waiter before its first `park` of a wait.
    #[inline]
    fn prepare(&self) {}

    /// Wake the waiter if it is parked. A wake that arrives before `park` must not be lost.
    fn unpark(&self);

    /// Suspend the waiter for at most `timeout_ms` ([`WAIT_FOREVER`] for no limit).
    /// Spurious returns are allowed.
    fn park(&self, timeout_ms: u32);
}

/// Busy-wait wake channel for bare-metal targets.
#[derive(Debug, Default, Clone, Copy)]
pub struct Spin;

impl Park for Spin {
    #[inline]
    fn unpark(&self) {}

    #[inline]
    fn park(&self, _timeout_ms: u32) {
        core::hint::spin_loop();
    }
}

/// Parks the waiting thread with `std::thread::park_timeout`.
///
/// The thread that first prepares a wait is recorded as the waiter thread.
#[cfg(feature = "std")]
#[derive(Debug, Default)]
pub struct ThreadPark {
    waiter: std::sync::OnceLock<std::thread::Thread>,
}

#[cfg(feature = "std")]
impl ThreadPark {
    pub const fn new() -> Self {
        Self {
            waiter: std::sync::OnceLock::new(),
        }
    }
}

#[cfg(feature = "std")]
impl Park for ThreadPark {
    fn prepare(&self) {
        self.waiter.get_or_init(std::thread::current);
    }

    fn unpark(&self) {
        if let Some(thread) = self.waiter.get() {
            thread.unpark();
        }
    }

    fn park(&self, timeout_ms: u32) {
        if timeout_ms == WAIT_FOREVER {
            std::thread::park();
        } else {
            std::thread::park_timeout(core::time::Duration::from_millis(u64::from(timeout_ms)));
        }
    }
}

/// Single-waiter, multi-setter event flag.
pub struct EventFlag<P: Park = Spin> {
    bits: AtomicU32,
    waiter_taken: AtomicBool,
    park: P,
}

impl EventFlag<Spin> {
    pub const fn new() -> Self {
        Self::with_park(Spin)
    }
}

impl Default for EventFlag<Spin> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Park> EventFlag<P> {
    pub const fn with_park(park: P) -> Self {
        Self {
            bits: AtomicU32::new(0),
            waiter_taken: AtomicBool::new(false),
            park,
        }
    }

    /// Create a setter handle. Any number may be active.
    #[inline]
    pub fn setter(&self) -> FlagSetter<'_, P> {
        FlagSetter { flag: self }
    }

    /// Claim the waiter handle, or `None` if one is already active.
    pub fn try_waiter(&self) -> Option<FlagWaiter<'_, P>> {
        self.waiter_taken
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| FlagWaiter { flag: self })
    }

    /// Claim the waiter handle.
    ///
    /// # Panics
    /// If another waiter is active.
    pub fn waiter(&self) -> FlagWaiter<'_, P> {
        match self.try_waiter() {
            Some(w) => w,
            None => panic!("event flag already has an active waiter"),
        }
    }

    /// OR `bits` into the word and wake the waiter. Returns the word after the set.
    #[inline]
    pub fn set(&self, bits: Flags) -> Flags {
        let bits = bits & Flags::ALL;
        let prev = self.bits.fetch_or(bits.bits(), Ordering::Release);
        self.park.unpark();
        Flags::from_raw(prev) | bits
    }

    #[inline]
    pub fn get(&self) -> Flags {
        Flags::from_raw(self.raw())
    }

    /// The live word, unmasked.
    #[inline]
    pub fn raw(&self) -> u32 {
        self.bits.load(Ordering::Acquire)
    }

    /// True when any bit is set; the event loop dispatches the consumer on this.
    #[inline]
    pub fn is_signalled(&self) -> bool {
        self.raw() != 0
    }

    /// Idle the cooperative loop until a bit is set or `timeout_ms` passes.
    pub(crate) fn idle(&self, timeout_ms: u32) {
        self.park.prepare();
        if !self.is_signalled() {
            self.park.park(timeout_ms);
        }
    }

    #[inline]
    fn clear_inner(&self, bits: Flags) -> Flags {
        Flags::from_raw(self.bits.fetch_and(!bits.bits(), Ordering::AcqRel))
    }

    #[inline]
    fn take(&self, bits: Flags, policy: MatchPolicy) -> Option<Flags> {
        let satisfied = self.get() & bits;
        let ok = match policy {
            MatchPolicy::Any => !satisfied.is_empty(),
            MatchPolicy::All => satisfied == bits,
        };
        if !ok {
            return None;
        }
        // Only the waiter clears, so `satisfied` cannot vanish between the load and this RMW.
        self.bits.fetch_and(!satisfied.bits(), Ordering::AcqRel);
        Some(satisfied)
    }
}

/// Interrupt-side handle: set and read only.
pub struct FlagSetter<'a, P: Park = Spin> {
    flag: &'a EventFlag<P>,
}

impl<P: Park> Clone for FlagSetter<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Park> Copy for FlagSetter<'_, P> {}

impl<'a, P: Park> FlagSetter<'a, P> {
    #[inline]
    pub fn set(&self, bits: Flags) -> Flags {
        self.flag.set(bits)
    }

    #[inline]
    pub fn get(&self) -> Flags {
        self.flag.get()
    }
}

/// Cooperative-side handle. Only one exists at a time; dropping it releases the claim.
pub struct FlagWaiter<'a, P: Park = Spin> {
    flag: &'a EventFlag<P>,
}

impl<'a, P: Park> FlagWaiter<'a, P> {
    #[inline]
    pub fn set(&self, bits: Flags) -> Flags {
        self.flag.set(bits)
    }

    #[inline]
    pub fn get(&self) -> Flags {
        self.flag.get()
    }

    /// Clear exactly `bits`; returns the word as it was before clearing.
    #[inline]
    pub fn clear(&mut self, bits: Flags) -> Flags {
        self.flag.clear_inner(bits)
    }

    /// Take satisfied bits without waiting (a wait with zero timeout).
    pub fn poll(&mut self, bits: Flags, policy: MatchPolicy) -> Result<Flags, WaitError> {
        let bits = bits & Flags::ALL;
        if bits.is_empty() {
            return Err(WaitError::Unknown);
        }
        self.flag.take(bits, policy).ok_or(WaitError::Timeout)
    }

    /// Block until `bits` satisfy `policy` or `timeout_ms` elapses, then clear and return the
    /// satisfied bits. `0` polls; [`WAIT_FOREVER`] never times out.
    pub fn wait<C: Clock + ?Sized>(
        &mut self,
        bits: Flags,
        policy: MatchPolicy,
        timeout_ms: u32,
        clock: &C,
    ) -> Result<Flags, WaitError> {
        match self.poll(bits, policy) {
            Err(WaitError::Timeout) if timeout_ms != 0 => {}
            done => return done,
        }
        let bits = bits & Flags::ALL;

        self.flag.park.prepare();
        let start = clock.now_ms();
        loop {
            if let Some(got) = self.flag.take(bits, policy) {
                return Ok(got);
            }
            let remaining = if timeout_ms == WAIT_FOREVER {
                WAIT_FOREVER
            } else {
                let elapsed = clock.now_ms().saturating_sub(start);
                if elapsed >= u64::from(timeout_ms) {
                    return Err(WaitError::Timeout);
                }
                (u64::from(timeout_ms) - elapsed) as u32
            };
            self.flag.park.park(remaining);
        }
    }
}

impl<P: Park> Drop for FlagWaiter<'_, P> {
    fn drop(&mut self) {
        self.flag.waiter_taken.store(false, Ordering::Release);
    }
}
