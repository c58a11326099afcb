//! Event-flag primitive and interrupt/cooperative diagnostic harness for no-std embedded targets.
//!
//! # Highlights
//! - Lock-free event flag: one atomic word, many interrupt-side setters, one cooperative waiter.
//! - Lock-free bounded append log, safe to append from any number of contexts.
//! - Interrupt-side handles cannot reach the blocking half of the flag.
//! - No allocation, no globals: one [`Harness`] is built at startup and borrowed by every handler.
//!
//! # Quick start
//! ```
//! use ph_eventflag::{Flags, MatchPolicy, EventFlag, WaitError};
//!
//! let flag = EventFlag::new();
//! let setter = flag.setter();
//! let mut waiter = flag.waiter();
//!
//! setter.set(Flags::LEFT);
//! assert_eq!(waiter.poll(Flags::ALL, MatchPolicy::Any), Ok(Flags::LEFT));
//! assert_eq!(waiter.poll(Flags::ALL, MatchPolicy::Any), Err(WaitError::Timeout));
//! ```
//!
//! # Harness
//! ```text
//! edge ──▶ ProducerHandler ──▶ irq log + EventFlag::set        (interrupt context)
//!                                   │
//!                  EventLoop::step ─┴─▶ ConsumerHandler ──▶ event log + counters
//!                                  └──▶ ModeController (every tick period)
//! ```
//!
//! # No-std
//! The crate is `#![no_std]` by default. Tests require `std`. The `std` feature adds
//! `ThreadPark` and `StdClock`.
//!
//! # Safety and concurrency
//! Exactly one waiter may be active per flag; `waiter()` panics if another is alive and
//! `try_waiter()` returns `None`. There is no `unsafe` in this crate.
//!
//! # Features
//! - `portable-atomic`, `portable-atomic-unsafe-assume-single-core`,
//!   `portable-atomic-critical-section`: atomics for targets without native CAS.
//! - `defmt` / `log`: diagnostic logging from the cooperative paths.
//! - `std`: thread-parking wake channel and `Instant` clock.
#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

#[macro_use]
mod fmt;

mod atomic;

pub mod append_log;
pub mod config;
pub mod consumer;
pub mod context;
pub mod controller;
pub mod counters;
pub mod event_flag;
pub mod event_loop;
pub mod flags;
pub mod io;
pub mod mode;
pub mod producer;

pub use append_log::{AppendLog, LogAppender};
pub use config::HarnessConfig;
pub use consumer::{ConsumerHandler, Signal};
pub use context::Harness;
pub use controller::{ControllerInputs, ModeController, TickOutcome};
pub use counters::{CounterSnapshot, Counters};
pub use event_flag::{EventFlag, FlagSetter, FlagWaiter, Park, Spin};
#[cfg(feature = "std")]
pub use event_flag::ThreadPark;
pub use event_loop::{EventLoop, RunSummary, StepReport};
pub use flags::{Flags, MatchPolicy, WAIT_FOREVER, WaitError};
#[cfg(feature = "std")]
pub use io::StdClock;
pub use io::{Clock, Rgb, StatusDisplay, StatusLight, StatusView};
pub use mode::{AtomicMode, AtomicSwitch, Debouncer, Mode};
pub use producer::{EdgeOutcome, ProducerHandler};
