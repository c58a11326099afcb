//! Cooperative run loop.
//!
//! Single-threaded: the consumer dispatch and the controller tick never overlap. Producers
//! may preempt either at any point. The loop only ends on a tick boundary.

use embedded_hal::digital::InputPin;

use crate::config::{HarnessConfig, LOG_CAPACITY};
use crate::consumer::{ConsumerHandler, Signal};
use crate::controller::{ModeController, TickOutcome};
use crate::context::Harness;
use crate::event_flag::{Park, Spin};
use crate::io::{Clock, StatusDisplay, StatusLight};

/// What one [`EventLoop::step`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepReport {
    pub signal: Option<Signal>,
    pub tick: Option<TickOutcome>,
}

impl StepReport {
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.signal.is_none() && self.tick.is_none()
    }
}

/// Totals returned by [`EventLoop::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunSummary {
    pub dispatches: u32,
    pub ticks: u32,
}

pub struct EventLoop<'a, C, L, D, S, M, T, P: Park = Spin, const N: usize = LOG_CAPACITY> {
    harness: &'a Harness<P, N>,
    consumer: ConsumerHandler<'a, P, N>,
    controller: ModeController<'a, S, M, T, P, N>,
    clock: C,
    light: L,
    display: D,
    tick_period_ms: u64,
    next_tick_ms: u64,
    summary: RunSummary,
    stopped: bool,
}

impl<'a, C, L, D, S, M, T, P, const N: usize> EventLoop<'a, C, L, D, S, M, T, P, N>
where
    C: Clock,
    L: StatusLight,
    D: StatusDisplay,
    S: InputPin,
    M: InputPin,
    T: InputPin,
    P: Park,
{
    /// Wire the consumer and controller to their collaborators. The first tick is due one
    /// period from now.
    pub fn new(
        harness: &'a Harness<P, N>,
        consumer: ConsumerHandler<'a, P, N>,
        controller: ModeController<'a, S, M, T, P, N>,
        clock: C,
        light: L,
        display: D,
        config: &HarnessConfig,
    ) -> Self {
        let tick_period_ms = u64::from(config.tick_period_ms.max(1));
        let next_tick_ms = clock.now_ms().saturating_add(tick_period_ms);
        Self {
            harness,
            consumer,
            controller,
            clock,
            light,
            display,
            tick_period_ms,
            next_tick_ms,
            summary: RunSummary::default(),
            stopped: false,
        }
    }

    /// One pass: dispatch the consumer if signalled, then tick if due.
    pub fn step(&mut self) -> StepReport {
        let mut report = StepReport::default();
        if self.stopped {
            return report;
        }

        if self.harness.flag.is_signalled() {
            report.signal = Some(self.consumer.on_signal(&self.clock, &mut self.light));
            self.summary.dispatches = self.summary.dispatches.wrapping_add(1);
        }

        let now = self.clock.now_ms();
        if now >= self.next_tick_ms {
            // Skip missed periods instead of bursting ticks.
            let behind = (now - self.next_tick_ms) / self.tick_period_ms;
            self.next_tick_ms += (behind + 1) * self.tick_period_ms;

            let outcome = self.controller.tick(now, &mut self.display);
            self.summary.ticks = self.summary.ticks.wrapping_add(1);
            if outcome == TickOutcome::Stop {
                debug!("event loop stopping after {} ticks", self.summary.ticks);
                self.stopped = true;
            }
            report.tick = Some(outcome);
        }

        report
    }

    /// Step until a tick returns [`TickOutcome::Stop`], idling on the flag's wake channel
    /// between passes.
    pub fn run(&mut self) -> RunSummary {
        while !self.stopped {
            let report = self.step();
            if report.is_idle() {
                let until_tick = self.next_tick_ms.saturating_sub(self.clock.now_ms());
                self.harness.flag.idle(until_tick.min(u64::from(u32::MAX - 1)) as u32);
            }
        }
        self.summary
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    #[inline]
    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    #[inline]
    pub fn light(&self) -> &L {
        &self.light
    }

    #[inline]
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Tear the loop apart, releasing the waiter and returning the collaborators.
    pub fn into_parts(self) -> (C, L, D) {
        (self.clock, self.light, self.display)
    }
}
