use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{I2c, Operation, SevenBitAddress};
use embedded_storage::{ReadStorage, Storage};

/// Anything byte-addressable that can be read and written in place. [`Eeprom`] is the provided
/// implementation for I2C EEPROMs, tests may use any in-memory storage.
pub trait Platform: Storage {}

impl<T: Storage> Platform for T {}

pub const DEFAULT_DEVICE_ADDRESS: SevenBitAddress = 0x50;
pub const DEFAULT_WRITE_DELAY_MS: u32 = 5;
pub const DEFAULT_CAPACITY: usize = 32 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EepromConfig {
    /// 7-bit bus address of the device
    pub device_address: SevenBitAddress,
    /// Write cycle time. Every write blocks this long before returning.
    pub write_delay_ms: u32,
    /// Size of the address space in bytes, at most 64 KiB as addresses are 16 bit
    pub capacity: usize,
}

impl Default for EepromConfig {
    fn default() -> Self {
        Self {
            device_address: DEFAULT_DEVICE_ADDRESS,
            write_delay_ms: DEFAULT_WRITE_DELAY_MS,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum EepromError<E> {
    /// Returned from the bus as is
    Bus(E),
    AddressOutOfRange,
}

/// I2C EEPROM with 16-bit memory addresses (24LC256 and friends).
///
/// Writes are a single transaction of the big-endian address followed by the payload, then a
/// blocking delay for the write cycle. Reads send the address and read back `len` bytes after a
/// repeated start. Nothing is retried.
pub struct Eeprom<I2C, D> {
    i2c: I2C,
    delay: D,
    config: EepromConfig,
}

impl<I2C: I2c, D: DelayNs> Eeprom<I2C, D> {
    pub fn new(i2c: I2C, delay: D, config: EepromConfig) -> Self {
        Self { i2c, delay, config }
    }

    pub fn config(&self) -> &EepromConfig {
        &self.config
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn memory_address(&self, offset: u32, len: usize) -> Result<[u8; 2], EepromError<I2C::Error>> {
        let end = offset as usize + len;
        if end > self.config.capacity || offset > u16::MAX as u32 {
            return Err(EepromError::AddressOutOfRange);
        }
        Ok((offset as u16).to_be_bytes())
    }
}

impl<I2C: I2c, D: DelayNs> ReadStorage for Eeprom<I2C, D> {
    type Error = EepromError<I2C::Error>;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let address = self.memory_address(offset, bytes.len())?;
        self.i2c
            .write_read(self.config.device_address, &address, bytes)
            .map_err(EepromError::Bus)
    }

    fn capacity(&self) -> usize {
        self.config.capacity
    }
}

impl<I2C: I2c, D: DelayNs> Storage for Eeprom<I2C, D> {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let address = self.memory_address(offset, bytes.len())?;

        // adjacent writes go out back to back without a repeated start
        self.i2c
            .transaction(
                self.config.device_address,
                &mut [Operation::Write(&address), Operation::Write(bytes)],
            )
            .map_err(EepromError::Bus)?;

        self.delay.delay_ms(self.config.write_delay_ms);
        Ok(())
    }
}
