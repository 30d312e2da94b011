#![doc = include_str ! ("../README.md")]
#![cfg_attr(not(target_arch = "x86_64"), no_std)]

pub mod command;
pub mod controller;
mod crc;
pub mod error;
pub mod event;
mod layout;
mod log;
pub mod platform;
mod state;

pub use command::{COMMAND_WINDOW, Command};
pub use crc::crc16;
pub use layout::StoreLayout;
pub use log::{LOG_SIZE, LogEntry, MAX_LOG_LEN, MAX_LOGS, MIN_LOG_LEN, encode_entry, validate_slot};
pub use state::{
    Brightness, LED_BRIGHT_DEFAULT, LED_BRIGHT_MAX, LED_BRIGHT_MIN, LED_COUNT, LedId, LedState,
    LedStatus,
};

extern crate alloc;

use crate::error::Error;
use crate::platform::Platform;
#[cfg(feature = "defmt")]
use defmt::trace;

/// The Store owns the persistent device and the address layout. LED state, brightness and the
/// log region are all accessed through it, so there is exactly one reader/writer of the device.
///
/// Appending a log entry is a scan followed by a write and is not atomic. Callers sharing a
/// store between contexts have to serialize access themselves.
pub struct Store<T: Platform> {
    pub(crate) hal: T,
    pub(crate) layout: StoreLayout,
}

impl<T: Platform> Store<T> {
    /// Checks that the layout regions don't overlap and fit into the device before taking
    /// ownership of it. Nothing is read or written.
    pub fn new(layout: StoreLayout, hal: T) -> Result<Store<T>, Error> {
        layout.validate(hal.capacity())?;

        #[cfg(feature = "defmt")]
        trace!(
            "store: {} log slots of {} bytes @{:#06x}",
            layout.max_slots, layout.slot_size, layout.log_start
        );

        Ok(Self { hal, layout })
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Longest text accepted by [`Store::append_log`] for this layout.
    pub fn max_log_len(&self) -> usize {
        self.layout.max_log_len()
    }

    /// Gives the device back, e.g. to re-open it with a fresh store after a simulated reboot.
    pub fn release(self) -> T {
        self.hal
    }

    pub(crate) fn read_bytes(&mut self, address: u16, bytes: &mut [u8]) -> Result<(), Error> {
        self.check_range(address, bytes.len())?;

        #[cfg(feature = "debug-logs")]
        println!("    store: read:  0x{address:04X}[{}]", bytes.len());

        self.hal
            .read(address as u32, bytes)
            .map_err(|_| Error::BusError)
    }

    pub(crate) fn write_bytes(&mut self, address: u16, bytes: &[u8]) -> Result<(), Error> {
        self.check_range(address, bytes.len())?;

        #[cfg(feature = "debug-logs")]
        println!("    store: write: 0x{address:04X}[{}]", bytes.len());

        self.hal
            .write(address as u32, bytes)
            .map_err(|_| Error::BusError)
    }

    fn check_range(&self, address: u16, len: usize) -> Result<(), Error> {
        if address as usize + len > self.hal.capacity() {
            return Err(Error::AddressOutOfRange);
        }
        Ok(())
    }
}
