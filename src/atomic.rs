//! Atomic backend selection.
//!
//! `core::sync::atomic` by default; `portable-atomic` for targets without native CAS
//! (e.g. thumbv6m with `portable-atomic-unsafe-assume-single-core`).

#[cfg(not(feature = "portable-atomic"))]
pub(crate) use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

#[cfg(feature = "portable-atomic")]
pub(crate) use portable_atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};
