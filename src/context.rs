//! Shared state every handler borrows.
//!
//! Constructed once at startup and handed to producers, the consumer and the controller by
//! reference. Nothing here is a global.

use crate::append_log::AppendLog;
use crate::config::LOG_CAPACITY;
use crate::counters::{CounterSnapshot, Counters};
use crate::event_flag::{EventFlag, Park, Spin};
use crate::io::{Rgb, StatusLight, StatusView};
use crate::mode::{AtomicMode, AtomicSwitch, Mode};

/// Flag word, both logs, counters and mode state.
pub struct Harness<P: Park = Spin, const N: usize = LOG_CAPACITY> {
    pub(crate) flag: EventFlag<P>,
    pub(crate) irq_log: AppendLog<N>,
    pub(crate) event_log: AppendLog<N>,
    pub(crate) counters: Counters,
    pub(crate) mode: AtomicMode,
    pub(crate) periodic: AtomicSwitch,
}

impl Harness<Spin, LOG_CAPACITY> {
    /// Zeroed logs and counters, `Mode::Wait`, periodic set disabled.
    pub fn new() -> Self {
        Self::with_park(Spin)
    }
}

impl Default for Harness<Spin, LOG_CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Park, const N: usize> Harness<P, N> {
    pub fn with_park(park: P) -> Self {
        debug!("harness init: log capacity {}", N);
        Self {
            flag: EventFlag::with_park(park),
            irq_log: AppendLog::new(),
            event_log: AppendLog::new(),
            counters: Counters::new(),
            mode: AtomicMode::new(Mode::Wait),
            periodic: AtomicSwitch::new(false),
        }
    }

    #[inline]
    pub fn flag(&self) -> &EventFlag<P> {
        &self.flag
    }

    /// Tags appended from interrupt context.
    #[inline]
    pub fn irq_log(&self) -> &AppendLog<N> {
        &self.irq_log
    }

    /// Tags appended by the consumer for bits it actually received.
    #[inline]
    pub fn event_log(&self) -> &AppendLog<N> {
        &self.event_log
    }

    #[inline]
    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode.load()
    }

    #[inline]
    pub fn periodic_enabled(&self) -> bool {
        self.periodic.get()
    }

    /// Current display payload.
    pub fn view(&self) -> StatusView<'_, N> {
        StatusView {
            irq_log: &self.irq_log,
            event_log: &self.event_log,
            mode: self.mode(),
            periodic: self.periodic_enabled(),
            counters: self.counters(),
        }
    }

    /// Release the harness and switch the status light off.
    pub fn teardown<L: StatusLight + ?Sized>(self, light: &mut L) {
        let c = self.counters();
        debug!(
            "harness teardown: events {} timeouts {} empty {} unknown {}",
            c.events,
            c.timeouts,
            c.empty,
            c.unknown
        );
        light.set_color(Rgb::OFF);
    }
}
