use crate::crc::crc16;
use crate::error::Error;
use crate::platform::Platform;
use crate::Store;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
#[cfg(feature = "defmt")]
use defmt::{debug, trace};

pub const LOG_SIZE: usize = 64;
pub const MAX_LOGS: usize = 32;
pub const MIN_LOG_LEN: usize = 1;
pub const MAX_LOG_LEN: usize = LOG_SIZE - ENTRY_OVERHEAD;

/// Terminator plus the two CRC bytes.
pub(crate) const ENTRY_OVERHEAD: usize = 3;

/// Written to the start of every slot by [`Store::erase_logs`]. A zero at index 0 can never be a
/// valid terminator, so the slot reads as empty.
const ERASED_HEADER: [u8; ENTRY_OVERHEAD] = [0; ENTRY_OVERHEAD];

/// A valid slot as found by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Zero based slot index
    pub slot: usize,
    pub text: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Log {}: {}", self.slot + 1, self.text)
    }
}

/// Checks whether a raw slot holds a live entry and returns its text and length.
///
/// A slot is occupied iff the first zero byte sits at an index `t` with
/// `MIN_LOG_LEN <= t <= slot.len() - 3` and `crc16(slot[..t + 3]) == 0`. There is no separate
/// occupancy flag: everything else, erased or never written, is empty.
pub fn validate_slot(slot: &[u8]) -> Option<(&[u8], usize)> {
    let max_len = slot.len().checked_sub(ENTRY_OVERHEAD)?;
    let terminator = slot.iter().position(|&b| b == 0)?;

    if terminator < MIN_LOG_LEN || terminator > max_len {
        return None;
    }

    if crc16(&slot[..terminator + ENTRY_OVERHEAD]) != 0 {
        return None;
    }

    Some((&slot[..terminator], terminator))
}

/// Encodes `text` as `[text][0x00][crc msb][crc lsb]` where the CRC covers text and terminator.
///
/// `max_len` is the longest text a slot can hold.
pub fn encode_entry(text: &[u8], max_len: usize) -> Result<Vec<u8>, Error> {
    if text.len() < MIN_LOG_LEN {
        return Err(Error::LogEntryEmpty);
    }
    if text.len() > max_len {
        return Err(Error::LogEntryTooLong);
    }
    if text.contains(&0) {
        return Err(Error::LogEntryMalformed);
    }

    let mut buf = Vec::with_capacity(text.len() + ENTRY_OVERHEAD);
    buf.extend_from_slice(text);
    buf.push(0);
    let crc = crc16(&buf);
    buf.extend_from_slice(&crc.to_be_bytes());

    Ok(buf)
}

impl<T: Platform> Store<T> {
    /// Writes `text` into the lowest-indexed empty slot and returns that slot.
    ///
    /// When every slot is occupied the whole region is erased first and the entry lands in
    /// slot 0. The entry itself is a single device write.
    pub fn append_log(&mut self, text: impl AsRef<[u8]>) -> Result<usize, Error> {
        let entry = encode_entry(text.as_ref(), self.max_log_len())?;

        let slot = match self.find_free_slot()? {
            Some(slot) => slot,
            None => {
                #[cfg(feature = "defmt")]
                debug!("append_log: log region full, erasing");

                self.erase_logs()?;
                0
            }
        };

        #[cfg(feature = "defmt")]
        trace!("append_log: slot {} [{}]", slot, entry.len());

        #[cfg(feature = "debug-logs")]
        println!("  log: append to slot {slot}");

        let address = self.layout.slot_address(slot);
        self.write_bytes(address, &entry)?;

        Ok(slot)
    }

    /// Reads a single slot. `None` if it is empty.
    pub fn read_log(&mut self, slot: usize) -> Result<Option<LogEntry>, Error> {
        if slot >= self.layout.max_slots as usize {
            return Err(Error::SlotOutOfRange);
        }

        let mut buf = vec![0u8; self.layout.slot_size as usize];
        self.read_slot(slot, &mut buf)?;

        Ok(validate_slot(&buf).map(|(text, _)| LogEntry {
            slot,
            text: String::from_utf8_lossy(text).into_owned(),
        }))
    }

    /// Reads every slot in order and returns the valid ones. Invalid slots are skipped.
    pub fn read_logs(&mut self) -> Result<Vec<LogEntry>, Error> {
        let mut buf = vec![0u8; self.layout.slot_size as usize];
        let mut entries = Vec::new();

        for slot in 0..self.layout.max_slots as usize {
            self.read_slot(slot, &mut buf)?;
            if let Some((text, _)) = validate_slot(&buf) {
                entries.push(LogEntry {
                    slot,
                    text: String::from_utf8_lossy(text).into_owned(),
                });
            }
        }

        #[cfg(feature = "defmt")]
        trace!("read_logs: {} valid entries", entries.len());

        Ok(entries)
    }

    /// Zeroes the 3 header bytes of every slot, one write per slot.
    pub fn erase_logs(&mut self) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        debug!("erase_logs: {} slots", self.layout.max_slots);

        #[cfg(feature = "debug-logs")]
        println!("  log: erase all");

        for slot in 0..self.layout.max_slots as usize {
            let address = self.layout.slot_address(slot);
            self.write_bytes(address, &ERASED_HEADER)?;
        }

        Ok(())
    }

    fn find_free_slot(&mut self) -> Result<Option<usize>, Error> {
        let mut buf = vec![0u8; self.layout.slot_size as usize];

        for slot in 0..self.layout.max_slots as usize {
            self.read_slot(slot, &mut buf)?;
            if validate_slot(&buf).is_none() {
                return Ok(Some(slot));
            }
        }

        Ok(None)
    }

    fn read_slot(&mut self, slot: usize, buf: &mut [u8]) -> Result<(), Error> {
        let address = self.layout.slot_address(slot);
        self.read_bytes(address, buf)
    }
}
