use thiserror::Error;

/// Errors that can occur during store operations. Marked as non-exhaustive to allow for future
/// additions without breaking the API. Corrupted LED state is reported as `InvalidLedState`,
/// while invalid log slots and out-of-range brightness values are never errors: the former read
/// as empty and the latter are replaced on read.
#[derive(Error, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// The device did not respond or the bus reported a failure. Not retried.
    #[error("internal bus error")]
    BusError,

    /// The access would run past the capacity of the device
    #[error("address out of range")]
    AddressOutOfRange,

    /// Regions overlap, don't fit the device, or the log region isn't `slot_size * max_slots` bytes
    #[error("invalid store layout")]
    InvalidLayout,

    /// The LED state byte and its inverse copy disagree. No prior state can be trusted.
    #[error("led state and its inverse do not match")]
    InvalidLedState,

    /// Log entries need at least `MIN_LOG_LEN` bytes of text
    #[error("log entry is empty")]
    LogEntryEmpty,

    /// Log entries are limited to `slot_size - 3` bytes of text
    #[error("log entry too long")]
    LogEntryTooLong,

    /// The text contains a NUL byte, which would end the entry early on read
    #[error("log entry malformed")]
    LogEntryMalformed,

    /// The requested slot is not part of the log region
    #[error("log slot out of range")]
    SlotOutOfRange,

    /// The formatter passed to a command failed
    #[error("output error")]
    OutputError,
}
