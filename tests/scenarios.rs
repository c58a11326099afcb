//! End-to-end harness scenarios: producers, consumer and controller on one shared context.

use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;
use std::sync::Arc;
use std::thread;

use embedded_hal::digital::{ErrorType, InputPin};
use ph_eventflag::{
    Clock, ConsumerHandler, ControllerInputs, EdgeOutcome, EventLoop, Flags, Harness, HarnessConfig,
    Mode, ModeController, ProducerHandler, Rgb, Signal, StatusDisplay, StatusLight, StatusView,
    TickOutcome, WaitError,
};

/// Level shared between the test and the handler that owns the pin. `true` = held low.
#[derive(Clone, Default)]
struct Line(Rc<Cell<bool>>);

impl Line {
    fn low() -> Self {
        let line = Line::default();
        line.0.set(true);
        line
    }

    fn set_low(&self, low: bool) {
        self.0.set(low);
    }
}

impl ErrorType for Line {
    type Error = Infallible;
}

impl InputPin for Line {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.get())
    }
}

/// Thread-safe pin that always reads low.
struct Grounded;

impl ErrorType for Grounded {
    type Error = Infallible;
}

impl InputPin for Grounded {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

#[derive(Clone, Default)]
struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

#[derive(Default)]
struct Led(Option<Rgb>);

impl StatusLight for Led {
    fn set_color(&mut self, color: Rgb) {
        self.0 = Some(color);
    }
}

#[derive(Default)]
struct Screen(Option<String>);

impl StatusDisplay for Screen {
    fn refresh<const N: usize>(&mut self, view: &StatusView<'_, N>) {
        self.0 = Some(view.to_string());
    }
}

#[test]
fn left_in_clear_mode_reaches_event_log() {
    let h = Harness::new();
    let clock = ManualClock::default();
    let mode_btn = Line::default();
    let cfg = HarnessConfig::default();

    let mut ctl = ModeController::new(
        &h,
        ControllerInputs {
            stop: Line::default(),
            mode: mode_btn.clone(),
            periodic: Line::default(),
        },
        &cfg,
    );
    let mut screen = Screen::default();
    mode_btn.set_low(true);
    assert_eq!(ctl.tick(0, &mut screen), TickOutcome::Continue);
    mode_btn.set_low(false);
    assert_eq!(h.mode(), Mode::Clear);

    let mut left = ProducerHandler::left(&h, Line::low());
    assert_eq!(left.on_falling_edge(), EdgeOutcome::Accepted);

    let mut consumer = ConsumerHandler::new(&h);
    let mut led = Led::default();
    assert_eq!(consumer.on_signal(&clock, &mut led), Signal::Delivered(Flags::LEFT));

    assert_eq!(h.event_log().to_string(), "L");
    let c = h.counters();
    assert_eq!((c.events, c.timeouts, c.empty, c.unknown), (1, 0, 0, 0));
    assert_eq!(led.0, None);
}

#[test]
fn wait_mode_on_empty_flag_is_timeout() {
    let h = Harness::new();
    let clock = ManualClock::default();
    let mut consumer = ConsumerHandler::new(&h);
    let mut led = Led::default();

    assert_eq!(h.mode(), Mode::Wait);
    assert_eq!(consumer.on_signal(&clock, &mut led), Signal::Failed(WaitError::Timeout));
    assert_eq!(h.counters().timeouts, 1);
    assert_eq!(led.0, Some(Rgb::ALERT));
}

#[test]
fn both_producers_before_one_dispatch() {
    for mode in [Mode::Clear, Mode::Wait] {
        let h = Harness::new();
        if mode == Mode::Clear {
            let btn = Line::low();
            let mut ctl = ModeController::new(
                &h,
                ControllerInputs {
                    stop: Line::default(),
                    mode: btn,
                    periodic: Line::default(),
                },
                &HarnessConfig::default(),
            );
            ctl.tick(0, &mut Screen::default());
        }
        assert_eq!(h.mode(), mode);

        let mut right = ProducerHandler::right(&h, Line::low());
        let mut left = ProducerHandler::left(&h, Line::low());
        right.on_falling_edge();
        left.on_falling_edge();

        let mut consumer = ConsumerHandler::new(&h);
        let got = consumer.on_signal(&ManualClock::default(), &mut Led::default());
        assert_eq!(got, Signal::Delivered(Flags::LEFT | Flags::RIGHT));

        let evt = h.event_log().to_string();
        assert_eq!(evt.len(), 2);
        assert_eq!(evt.matches('L').count(), 1);
        assert_eq!(evt.matches('R').count(), 1);
    }
}

#[test]
fn rapid_triggers_pin_irq_log_at_capacity() {
    let h = Harness::new();
    let mut left = ProducerHandler::left(&h, Line::low());

    for _ in 0..150 {
        assert_eq!(left.on_falling_edge(), EdgeOutcome::Accepted);
    }

    let log = h.irq_log();
    assert_eq!(log.len(), 100);
    assert_eq!(log.dropped(), 50);
    assert_eq!(log.to_string(), "L".repeat(100));
    assert_eq!(h.flag().get(), Flags::LEFT);
}

#[test]
fn spurious_rising_edge_changes_nothing() {
    let h = Harness::new();
    let line = Line::low();
    let mut right = ProducerHandler::right(&h, line.clone());

    line.set_low(false);
    assert_eq!(right.on_falling_edge(), EdgeOutcome::Spurious);
    assert!(h.irq_log().is_empty());
    assert!(!h.flag().is_signalled());
}

#[test]
fn producers_on_threads_interleave_without_loss() {
    let h = Arc::new(Harness::new());

    let handles: Vec<_> = [true, false]
        .into_iter()
        .map(|is_left| {
            let h = Arc::clone(&h);
            thread::spawn(move || {
                let mut p = if is_left {
                    ProducerHandler::left(&*h, Grounded)
                } else {
                    ProducerHandler::right(&*h, Grounded)
                };
                for _ in 0..40 {
                    p.on_falling_edge();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let irq = h.irq_log().to_string();
    assert_eq!(irq.len(), 80);
    assert_eq!(irq.matches('L').count(), 40);
    assert_eq!(irq.matches('R').count(), 40);
    assert_eq!(h.flag().get(), Flags::LEFT | Flags::RIGHT);
}

#[test]
fn event_loop_session_until_stop() {
    let h = Harness::new();
    let clock = ManualClock::default();
    let cfg = HarnessConfig::default();
    let stop = Line::default();
    let periodic = Line::default();

    let mut el = EventLoop::new(
        &h,
        ConsumerHandler::new(&h),
        ModeController::new(
            &h,
            ControllerInputs {
                stop: stop.clone(),
                mode: Line::default(),
                periodic: periodic.clone(),
            },
            &cfg,
        ),
        clock.clone(),
        Led::default(),
        Screen::default(),
        &cfg,
    );
    let mut left = ProducerHandler::left(&h, Line::low());

    left.on_falling_edge();
    assert_eq!(el.step().signal, Some(Signal::Delivered(Flags::LEFT)));

    // Enable the periodic bit; the next pass consumes it without a log tag.
    periodic.set_low(true);
    clock.advance(100);
    assert_eq!(el.step().tick, Some(TickOutcome::Continue));
    periodic.set_low(false);
    assert_eq!(el.step().signal, Some(Signal::Delivered(Flags::PERIODIC)));

    stop.set_low(true);
    clock.advance(100);
    let report = el.step();
    assert_eq!(report.tick, Some(TickOutcome::Stop));
    assert!(el.is_stopped());

    let (_, mut led, screen) = el.into_parts();
    let text = screen.0.unwrap_or_default();
    assert!(text.contains("IRQ: L\n"));
    assert!(text.contains("EVT: L\n"));
    assert!(text.contains("dummy evt timer: yes"));
    assert!(text.contains("evt cnt: 2"));

    h.teardown(&mut led);
    assert_eq!(led.0, Some(Rgb::OFF));
}
