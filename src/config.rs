//! Compile-time tuning.
//!
//! There is no configuration file; these constants are the defaults for [`HarnessConfig`].

/// Characters per bounded log.
pub const LOG_CAPACITY: usize = 100;

/// Controller tick period.
pub const TICK_PERIOD_MS: u32 = 100;

/// Minimum spacing between two accepted presses of the same toggle input.
pub const DEBOUNCE_MS: u32 = 300;

/// Log tag for the left producer.
pub const TAG_LEFT: u8 = b'L';

/// Log tag for the right producer.
pub const TAG_RIGHT: u8 = b'R';

/// Timing knobs for the controller and event loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HarnessConfig {
    pub tick_period_ms: u32,
    pub debounce_ms: u32,
}

impl HarnessConfig {
    pub const fn new() -> Self {
        Self {
            tick_period_ms: TICK_PERIOD_MS,
            debounce_ms: DEBOUNCE_MS,
        }
    }

    pub const fn with_tick_period(mut self, ms: u32) -> Self {
        self.tick_period_ms = ms;
        self
    }

    pub const fn with_debounce(mut self, ms: u32) -> Self {
        self.debounce_ms = ms;
        self
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new()
    }
}
