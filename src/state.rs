use crate::Store;
use crate::error::Error;
use crate::platform::Platform;
#[cfg(feature = "defmt")]
use defmt::{trace, warn};

pub const LED_COUNT: usize = 3;
pub const LED_BRIGHT_MIN: u16 = 0;
pub const LED_BRIGHT_MAX: u16 = 999;
/// Brightness restored on boot without trustworthy state, and when an LED is switched on at 0.
pub const LED_BRIGHT_DEFAULT: u16 = 500;
/// Replacement for an out-of-range brightness read from the device.
const LED_BRIGHT_MID: u16 = (LED_BRIGHT_MIN + LED_BRIGHT_MAX) / 2;

const LED_MASK: u8 = (1 << LED_COUNT) - 1;

#[derive(strum::FromRepr, strum::Display, Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LedId {
    Led1 = 0,
    Led2 = 1,
    Led3 = 2,
}

impl LedId {
    pub fn index(self) -> usize {
        self as usize
    }

    /// One based, as printed in log entries.
    pub fn number(self) -> usize {
        self.index() + 1
    }
}

/// On/off flags of the three LEDs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedState(pub [bool; LED_COUNT]);

impl LedState {
    pub fn is_on(&self, led: LedId) -> bool {
        self.0[led.index()]
    }

    pub fn set(&mut self, led: LedId, on: bool) {
        self.0[led.index()] = on;
    }

    /// Packs the flags MSB first into bits 2..=0. The second byte holds the complement of the same
    /// three bits.
    pub fn encode(&self) -> [u8; 2] {
        let state = self
            .0
            .iter()
            .fold(0u8, |acc, &on| (acc << 1) | on as u8);
        [state, !state & LED_MASK]
    }

    /// Fails with `InvalidLedState` unless every state bit is the complement of its inverse bit.
    /// Bits above bit 2 are ignored.
    pub fn decode(state: u8, inverse: u8) -> Result<Self, Error> {
        if (state ^ inverse) & LED_MASK != LED_MASK {
            return Err(Error::InvalidLedState);
        }

        let mut leds = [false; LED_COUNT];
        for (i, led) in leds.iter_mut().enumerate() {
            *led = state & (1 << (LED_COUNT - 1 - i)) != 0;
        }
        Ok(Self(leds))
    }
}

/// PWM level shared by all LEDs that are on, within `LED_BRIGHT_MIN..=LED_BRIGHT_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Brightness(u16);

impl Brightness {
    pub const MIN: Brightness = Brightness(LED_BRIGHT_MIN);
    pub const MAX: Brightness = Brightness(LED_BRIGHT_MAX);

    /// `None` outside of `LED_BRIGHT_MIN..=LED_BRIGHT_MAX`.
    pub fn new(value: u16) -> Option<Self> {
        (LED_BRIGHT_MIN..=LED_BRIGHT_MAX)
            .contains(&value)
            .then_some(Self(value))
    }

    pub fn get(self) -> u16 {
        self.0
    }

    pub fn encode(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    /// Out-of-range values are replaced by the midpoint of the valid range rather than rejected.
    pub fn decode(raw: [u8; 2]) -> Self {
        let value = u16::from_be_bytes(raw);
        Self::new(value).unwrap_or_else(|| {
            #[cfg(feature = "defmt")]
            warn!("brightness {} out of range, using {}", value, LED_BRIGHT_MID);

            Self(LED_BRIGHT_MID)
        })
    }

    pub fn step_up(self, step: u16) -> Self {
        Self(self.0.saturating_add(step).min(LED_BRIGHT_MAX))
    }

    pub fn step_down(self, step: u16) -> Self {
        Self(self.0.saturating_sub(step).max(LED_BRIGHT_MIN))
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self(LED_BRIGHT_DEFAULT)
    }
}

/// Everything that survives a reboot apart from the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedStatus {
    pub leds: LedState,
    pub brightness: Brightness,
}

impl Default for LedStatus {
    /// LED 2 on, the others off, brightness 500.
    fn default() -> Self {
        Self {
            leds: LedState([false, true, false]),
            brightness: Brightness::default(),
        }
    }
}

impl LedStatus {
    /// Applies a button press to `led`:
    ///  * off, brightness 0: switch on and restore the default brightness
    ///  * off: switch on
    ///  * on, brightness 0: stay on and restore the default brightness
    ///  * on: switch off
    pub fn toggle(&mut self, led: LedId) {
        let dark = self.brightness == Brightness::MIN;
        match (self.leds.is_on(led), dark) {
            (false, true) => {
                self.leds.set(led, true);
                self.brightness = Brightness::default();
            }
            (false, false) => self.leds.set(led, true),
            (true, true) => self.brightness = Brightness::default(),
            (true, false) => self.leds.set(led, false),
        }
    }
}

impl<T: Platform> Store<T> {
    /// Reads the LED flags and their inverse copy. `InvalidLedState` means neither can be trusted.
    pub fn read_led_state(&mut self) -> Result<LedState, Error> {
        let mut state = [0u8; 1];
        let mut inverse = [0u8; 1];
        self.read_bytes(self.layout.led_state_addr, &mut state)?;
        self.read_bytes(self.layout.inverse_addr, &mut inverse)?;

        #[cfg(feature = "defmt")]
        trace!("read_led_state: {:#04x} {:#04x}", state[0], inverse[0]);

        LedState::decode(state[0], inverse[0])
    }

    /// Writes the LED flags, then the inverse copy.
    pub fn write_led_state(&mut self, leds: &LedState) -> Result<(), Error> {
        let [state, inverse] = leds.encode();
        self.write_bytes(self.layout.led_state_addr, &[state])?;
        self.write_bytes(self.layout.inverse_addr, &[inverse])
    }

    pub fn read_brightness(&mut self) -> Result<Brightness, Error> {
        let mut raw = [0u8; 2];
        self.read_bytes(self.layout.brightness_addr, &mut raw)?;
        Ok(Brightness::decode(raw))
    }

    pub fn write_brightness(&mut self, brightness: Brightness) -> Result<(), Error> {
        self.write_bytes(self.layout.brightness_addr, &brightness.encode())
    }

    /// Restores the status saved before the last reset.
    ///
    /// A corrupted LED state falls back to [`LedStatus::default`], which is written back right away.
    /// Bus errors are returned as they are.
    pub fn load_led_status(&mut self) -> Result<LedStatus, Error> {
        match self.read_led_state() {
            Ok(leds) => Ok(LedStatus {
                leds,
                brightness: self.read_brightness()?,
            }),
            Err(Error::InvalidLedState) => {
                #[cfg(feature = "defmt")]
                warn!("led state and its inverse do not match, resetting to default");

                #[cfg(feature = "debug-logs")]
                println!("  state: invalid led state, using default");

                let status = LedStatus::default();
                self.save_led_status(&status)?;
                Ok(status)
            }
            Err(e) => Err(e),
        }
    }

    pub fn save_led_status(&mut self, status: &LedStatus) -> Result<(), Error> {
        self.write_led_state(&status.leds)?;
        self.write_brightness(status.brightness)
    }
}
