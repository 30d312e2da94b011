#![allow(dead_code)]

// filename according to https://doc.rust-lang.org/book/ch11-03-test-organization.html
use eeprom_log::platform::{Eeprom, EepromConfig};
use eeprom_log::{Store, StoreLayout};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{self, ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

pub const DEVICE_ADDRESS: u8 = 0x50;
pub const CAPACITY: usize = 32 * 1024;
pub const WRITE_DELAY_MS: u32 = 5;

pub const LED_STATE_ADDR: usize = 32767;
pub const INVERSE_ADDR: usize = 31000;
pub const BRIGHTNESS_ADDR: usize = 30000;
pub const LOG_SIZE: usize = 64;
pub const MAX_LOGS: usize = 32;

/// Simulated 24LC256: a 16-bit address pointer set by the first two written bytes of every
/// transaction, further writes store data, reads return data, both advance the pointer.
pub struct Bus {
    pub memory: Vec<u8>,
    pub fail_after_operation: usize,
    pub operations: Vec<Op>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Op {
    Read { address: u16, len: usize },
    Write { address: u16, len: usize },
}

impl Bus {
    /// Factory fresh, every cell reads 0xFF
    pub fn new() -> Self {
        Self {
            memory: vec![0xFFu8; CAPACITY],
            fail_after_operation: usize::MAX,
            operations: Vec::new(),
        }
    }

    pub fn new_with_fault(fail_after_operation: usize) -> Self {
        Self {
            fail_after_operation,
            ..Self::new()
        }
    }

    pub fn disable_faults(&mut self) {
        self.fail_after_operation = usize::MAX;
    }

    pub fn writes(&self) -> Vec<Op> {
        self.operations
            .iter()
            .filter(|op| matches!(op, Op::Write { .. }))
            .cloned()
            .collect()
    }

    pub fn reads(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, Op::Read { .. }))
            .count()
    }

    pub fn slot(&self, slot: usize) -> &[u8] {
        &self.memory[slot * LOG_SIZE..(slot + 1) * LOG_SIZE]
    }

    pub fn dump_operations(&self) {
        println!("Operations:");
        for op in &self.operations {
            println!("  {:?}", op);
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum BusFault {
    NoAcknowledge,
    Fault,
}

impl i2c::Error for BusFault {
    fn kind(&self) -> ErrorKind {
        match self {
            BusFault::NoAcknowledge => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            BusFault::Fault => ErrorKind::Other,
        }
    }
}

impl ErrorType for Bus {
    type Error = BusFault;
}

impl I2c for Bus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != DEVICE_ADDRESS {
            println!("    bus: NACK 0x{address:02X}");
            return Err(BusFault::NoAcknowledge);
        }

        if self.operations.len() >= self.fail_after_operation {
            println!("    bus: FAULT");
            return Err(BusFault::Fault);
        }

        let mut header = Vec::with_capacity(2);
        let mut pointer = 0usize;
        let mut written = 0usize;
        let mut read = 0usize;

        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    for &byte in bytes.iter() {
                        if header.len() < 2 {
                            header.push(byte);
                            if header.len() == 2 {
                                pointer = u16::from_be_bytes([header[0], header[1]]) as usize;
                            }
                        } else {
                            self.memory[pointer % CAPACITY] = byte;
                            pointer += 1;
                            written += 1;
                        }
                    }
                }
                Operation::Read(buf) => {
                    assert_eq!(header.len(), 2, "read without memory address");
                    for byte in buf.iter_mut() {
                        *byte = self.memory[pointer % CAPACITY];
                        pointer += 1;
                        read += 1;
                    }
                }
            }
        }

        assert_eq!(header.len(), 2, "transaction without memory address");
        let address = u16::from_be_bytes([header[0], header[1]]);

        let op = if read > 0 {
            Op::Read { address, len: read }
        } else {
            Op::Write {
                address,
                len: written,
            }
        };
        println!("    bus: {op:?} #{:>2}", self.operations.len());
        self.operations.push(op);

        Ok(())
    }
}

#[derive(Default)]
pub struct Delay {
    pub total_ms: u64,
    pub calls: usize,
}

impl DelayNs for Delay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ms += (ns / 1_000_000) as u64;
        self.calls += 1;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ms += ms as u64;
        self.calls += 1;
    }
}

pub type TestStore<'a> = Store<Eeprom<&'a mut Bus, &'a mut Delay>>;

pub fn store<'a>(bus: &'a mut Bus, delay: &'a mut Delay) -> TestStore<'a> {
    let eeprom = Eeprom::new(bus, delay, EepromConfig::default());
    Store::new(StoreLayout::default(), eeprom).unwrap()
}

/// Writes a raw, valid entry straight into the simulated memory.
pub fn put_entry(bus: &mut Bus, slot: usize, text: &str) {
    let entry = eeprom_log::encode_entry(text.as_bytes(), LOG_SIZE - 3).unwrap();
    let start = slot * LOG_SIZE;
    bus.memory[start..start + entry.len()].copy_from_slice(&entry);
}
