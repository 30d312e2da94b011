//! Main loop side of the LED dimmer: applies input events to the LED status and records them.
//!
//! Driving the PWM outputs is left to the caller, which reads [`Controller::status`] after every
//! processed event.

use crate::Store;
use crate::error::Error;
use crate::event::{Consumer, Debouncer, Direction, Event};
use crate::platform::Platform;
use crate::state::LedStatus;
use alloc::format;
#[cfg(feature = "defmt")]
use defmt::trace;

pub const DEFAULT_BRIGHTNESS_STEP: u16 = 10;
pub const DEFAULT_DEBOUNCE_MS: u64 = 20;

/// Text of the entry appended on every boot.
pub const BOOT_ENTRY: &str = "Boot";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerConfig {
    /// Brightness change per encoder step
    pub brightness_step: u16,
    /// How long a button has to read released before the next press is accepted
    pub debounce_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            brightness_step: DEFAULT_BRIGHTNESS_STEP,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl ControllerConfig {
    pub fn debouncer(&self) -> Debouncer {
        Debouncer::new(self.debounce_ms)
    }
}

pub struct Controller {
    config: ControllerConfig,
    status: LedStatus,
    boot_ms: u64,
}

impl Controller {
    /// Restores the saved LED status (falling back to the default on corruption) and appends
    /// [`BOOT_ENTRY`] to the log.
    pub fn boot<T: Platform>(
        store: &mut Store<T>,
        config: ControllerConfig,
        now_ms: u64,
    ) -> Result<Self, Error> {
        let status = store.load_led_status()?;

        #[cfg(feature = "defmt")]
        trace!("boot: {}", status);

        store.append_log(BOOT_ENTRY)?;

        Ok(Self {
            config,
            status,
            boot_ms: now_ms,
        })
    }

    pub fn status(&self) -> &LedStatus {
        &self.status
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Applies a single event and persists the result.
    ///
    /// Button presses write the LED state (and the brightness if the toggle restored it) and
    /// append a log entry. Encoder steps only write the brightness.
    pub fn handle_event<T: Platform>(
        &mut self,
        store: &mut Store<T>,
        event: Event,
        now_ms: u64,
    ) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        trace!("handle_event: {}", event);

        match event {
            Event::ButtonPressed(led) => {
                let before = self.status;
                self.status.toggle(led);

                store.write_led_state(&self.status.leds)?;
                if self.status.brightness != before.brightness {
                    store.write_brightness(self.status.brightness)?;
                }

                let seconds = now_ms.saturating_sub(self.boot_ms) / 1000;
                let mut entry = format!(
                    "Led {} toggled to state {}, seconds since boot: {}",
                    led.number(),
                    self.status.leds.is_on(led) as u8,
                    seconds
                );
                entry.truncate(store.max_log_len());
                store.append_log(entry)?;
            }
            Event::EncoderTurn(direction) => {
                let step = self.config.brightness_step;
                self.status.brightness = match direction {
                    Direction::Up => self.status.brightness.step_up(step),
                    Direction::Down => self.status.brightness.step_down(step),
                };
                store.write_brightness(self.status.brightness)?;
            }
        }

        Ok(())
    }

    /// Processes queued events in arrival order and returns how many were handled. Stops at the
    /// first error; the failing event is not retried.
    pub fn drain<T: Platform, const N: usize>(
        &mut self,
        store: &mut Store<T>,
        events: &mut Consumer<'_, Event, N>,
        now_ms: u64,
    ) -> Result<usize, Error> {
        let mut handled = 0;
        while let Some(event) = events.dequeue() {
            self.handle_event(store, event, now_ms)?;
            handled += 1;
        }
        Ok(handled)
    }
}
