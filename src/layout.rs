use crate::error::Error;
use crate::log::{ENTRY_OVERHEAD, LOG_SIZE, MAX_LOGS, MIN_LOG_LEN};
use core::ops::Range;

/// Reserved regions of the device address space. All addresses are byte offsets that are sent
/// big-endian on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StoreLayout {
    /// One byte, LED flags in bits 2..=0
    pub led_state_addr: u16,
    /// One byte, complement of the LED flags
    pub inverse_addr: u16,
    /// Two bytes, big-endian
    pub brightness_addr: u16,
    pub log_start: u16,
    /// Exclusive
    pub log_end: u16,
    pub slot_size: u16,
    pub max_slots: u16,
}

impl StoreLayout {
    /// The layout used by the lab firmware on a 32 KiB EEPROM.
    pub const DEFAULT: StoreLayout = StoreLayout {
        led_state_addr: 32767,
        inverse_addr: 31000,
        brightness_addr: 30000,
        log_start: 0,
        log_end: (LOG_SIZE * MAX_LOGS) as u16,
        slot_size: LOG_SIZE as u16,
        max_slots: MAX_LOGS as u16,
    };

    /// Checks the layout against a device of `capacity` bytes.
    pub fn validate(&self, capacity: usize) -> Result<(), Error> {
        if (self.slot_size as usize) < MIN_LOG_LEN + ENTRY_OVERHEAD || self.max_slots == 0 {
            return Err(Error::InvalidLayout);
        }

        if self.log_end <= self.log_start
            || (self.log_end - self.log_start) as usize
                != self.slot_size as usize * self.max_slots as usize
        {
            return Err(Error::InvalidLayout);
        }

        let regions = self.regions();
        for (i, a) in regions.iter().enumerate() {
            if a.end > capacity {
                return Err(Error::InvalidLayout);
            }
            for b in &regions[i + 1..] {
                if a.start < b.end && b.start < a.end {
                    return Err(Error::InvalidLayout);
                }
            }
        }

        Ok(())
    }

    /// Start address of `slot`. Only meaningful for `slot < max_slots`.
    pub fn slot_address(&self, slot: usize) -> u16 {
        self.log_start + (slot * self.slot_size as usize) as u16
    }

    pub fn max_log_len(&self) -> usize {
        self.slot_size as usize - ENTRY_OVERHEAD
    }

    fn regions(&self) -> [Range<usize>; 4] {
        let led = self.led_state_addr as usize;
        let inverse = self.inverse_addr as usize;
        let brightness = self.brightness_addr as usize;
        [
            led..led + 1,
            inverse..inverse + 1,
            brightness..brightness + 2,
            self.log_start as usize..self.log_end as usize,
        ]
    }
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}
