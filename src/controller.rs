//! Periodic cooperative-context tick: stop request, mode toggles, display, periodic bit.

use embedded_hal::digital::InputPin;

use crate::config::{HarnessConfig, LOG_CAPACITY};
use crate::context::Harness;
use crate::event_flag::{FlagSetter, Park, Spin};
use crate::flags::Flags;
use crate::io::StatusDisplay;
use crate::mode::Debouncer;

/// Level-sampled, active-low inputs polled once per tick.
pub struct ControllerInputs<S, M, T> {
    /// Stop request.
    pub stop: S,
    /// Flips [`Mode`](crate::Mode).
    pub mode: M,
    /// Flips the periodic-set switch.
    pub periodic: T,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    Continue,
    /// Stop was requested; the loop ends after this tick.
    Stop,
}

pub struct ModeController<'a, S, M, T, P: Park = Spin, const N: usize = LOG_CAPACITY> {
    harness: &'a Harness<P, N>,
    flag: FlagSetter<'a, P>,
    inputs: ControllerInputs<S, M, T>,
    mode_debounce: Debouncer,
    periodic_debounce: Debouncer,
}

/// Active-low read; an unreadable pin counts as released.
fn pressed<I: InputPin>(pin: &mut I) -> bool {
    pin.is_low().unwrap_or(false)
}

impl<'a, S, M, T, P, const N: usize> ModeController<'a, S, M, T, P, N>
where
    S: InputPin,
    M: InputPin,
    T: InputPin,
    P: Park,
{
    pub fn new(harness: &'a Harness<P, N>, inputs: ControllerInputs<S, M, T>, config: &HarnessConfig) -> Self {
        let window = u64::from(config.debounce_ms);
        Self {
            harness,
            flag: harness.flag.setter(),
            inputs,
            mode_debounce: Debouncer::new(window),
            periodic_debounce: Debouncer::new(window),
        }
    }

    /// Run one tick at `now_ms`.
    pub fn tick<D: StatusDisplay>(&mut self, now_ms: u64, display: &mut D) -> TickOutcome {
        let outcome = if pressed(&mut self.inputs.stop) {
            debug!("stop requested at {}", now_ms);
            TickOutcome::Stop
        } else {
            TickOutcome::Continue
        };

        if self.mode_debounce.press(pressed(&mut self.inputs.mode), now_ms) {
            let mode = self.harness.mode.toggle();
            debug!("mode -> {}", mode);
        }

        if self.periodic_debounce.press(pressed(&mut self.inputs.periodic), now_ms) {
            let on = self.harness.periodic.toggle();
            debug!("periodic set -> {}", on);
        }

        display.refresh(&self.harness.view());

        // Never cleared here; the next consumer pass over ALL takes it.
        if self.harness.periodic.get() {
            self.flag.set(Flags::PERIODIC);
        }

        outcome
    }

    /// Give the input pins back.
    pub fn release(self) -> ControllerInputs<S, M, T> {
        self.inputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::StatusView;
    use crate::mode::Mode;
    use core::cell::Cell;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;
    use std::rc::Rc;
    use std::string::{String, ToString};
    use std::vec::Vec;

    /// Pin whose level the test flips through a shared cell.
    #[derive(Clone, Default)]
    struct Button(Rc<Cell<bool>>);

    impl Button {
        fn press(&self) {
            self.0.set(true);
        }

        fn release(&self) {
            self.0.set(false);
        }
    }

    impl ErrorType for Button {
        type Error = Infallible;
    }

    impl InputPin for Button {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.0.get())
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(self.0.get())
        }
    }

    #[derive(Default)]
    struct Screen(Vec<String>);

    impl StatusDisplay for Screen {
        fn refresh<const N: usize>(&mut self, view: &StatusView<'_, N>) {
            self.0.push(view.to_string());
        }
    }

    fn buttons() -> (Button, Button, Button) {
        (Button::default(), Button::default(), Button::default())
    }

    #[test]
    fn idle_tick_refreshes_display_only() {
        let h = Harness::new();
        let (stop, mode, periodic) = buttons();
        let inputs = ControllerInputs { stop, mode, periodic };
        let mut ctl = ModeController::new(&h, inputs, &HarnessConfig::default());
        let mut screen = Screen::default();

        assert_eq!(ctl.tick(0, &mut screen), TickOutcome::Continue);
        assert_eq!(screen.0.len(), 1);
        assert!(screen.0[0].contains("unset method: wait"));
        assert!(!h.flag().is_signalled());
    }

    #[test]
    fn held_mode_button_flips_once_per_window() {
        let h = Harness::new();
        let (stop, mode, periodic) = buttons();
        let inputs = ControllerInputs { stop, mode: mode.clone(), periodic };
        let mut ctl = ModeController::new(&h, inputs, &HarnessConfig::default());
        let mut screen = Screen::default();

        mode.press();
        ctl.tick(0, &mut screen);
        assert_eq!(h.mode(), Mode::Clear);
        ctl.tick(100, &mut screen);
        ctl.tick(200, &mut screen);
        assert_eq!(h.mode(), Mode::Clear);

        ctl.tick(300, &mut screen);
        assert_eq!(h.mode(), Mode::Wait);
    }

    #[test]
    fn periodic_switch_sets_bit_each_tick() {
        let h = Harness::new();
        let (stop, mode, periodic) = buttons();
        let inputs = ControllerInputs { stop, mode, periodic: periodic.clone() };
        let mut ctl = ModeController::new(&h, inputs, &HarnessConfig::default());
        let mut screen = Screen::default();

        periodic.press();
        ctl.tick(0, &mut screen);
        periodic.release();
        assert!(h.periodic_enabled());
        assert_eq!(h.flag().get(), Flags::PERIODIC);
        assert!(screen.0[0].contains("dummy evt timer: yes"));

        let mut waiter = h.flag().waiter();
        waiter.clear(Flags::ALL);
        ctl.tick(100, &mut screen);
        assert_eq!(h.flag().get(), Flags::PERIODIC);
    }

    #[test]
    fn stop_finishes_the_tick() {
        let h = Harness::new();
        let (stop, mode, periodic) = buttons();
        let inputs = ControllerInputs { stop: stop.clone(), mode: mode.clone(), periodic };
        let mut ctl = ModeController::new(&h, inputs, &HarnessConfig::default());
        let mut screen = Screen::default();

        stop.press();
        mode.press();
        assert_eq!(ctl.tick(0, &mut screen), TickOutcome::Stop);
        assert_eq!(h.mode(), Mode::Clear, "toggles still processed on the stop tick");
        assert_eq!(screen.0.len(), 1);
    }

    #[test]
    fn debounce_window_is_configurable() {
        let h = Harness::new();
        let (stop, mode, periodic) = buttons();
        let inputs = ControllerInputs { stop, mode: mode.clone(), periodic };
        let cfg = HarnessConfig::default().with_debounce(50);
        let mut ctl = ModeController::new(&h, inputs, &cfg);
        let mut screen = Screen::default();

        mode.press();
        ctl.tick(0, &mut screen);
        ctl.tick(49, &mut screen);
        assert_eq!(h.mode(), Mode::Clear);
        ctl.tick(50, &mut screen);
        assert_eq!(h.mode(), Mode::Wait);
    }
}
