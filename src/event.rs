//! Input events passed from interrupt handlers to the main loop.
//!
//! Handlers only enqueue; all store access happens in the loop that drains the queue.

use crate::state::LedId;

pub use heapless::spsc::{Consumer, Producer};

/// Bounded single-producer single-consumer queue. Holds `N - 1` events.
pub type EventQueue<const N: usize> = heapless::spsc::Queue<Event, N>;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Direction of an encoder step sampled on the rising edge of channel A.
    pub fn from_quadrature(b_high: bool) -> Self {
        if b_high { Direction::Down } else { Direction::Up }
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    ButtonPressed(LedId),
    EncoderTurn(Direction),
}

/// Enqueues from interrupt context. A full queue drops the event.
pub fn push<const N: usize>(producer: &mut Producer<'_, Event, N>, event: Event) -> bool {
    producer.enqueue(event).is_ok()
}

/// Reports a button as released once its input has read high for `stable_ms` without
/// interruption. Time is passed in by the caller from a monotonic millisecond clock.
#[derive(Debug, Clone)]
pub struct Debouncer {
    stable_ms: u64,
    high_since: Option<u64>,
}

impl Debouncer {
    pub fn new(stable_ms: u64) -> Self {
        Self {
            stable_ms,
            high_since: None,
        }
    }

    pub fn poll(&mut self, high: bool, now_ms: u64) -> bool {
        if !high {
            self.high_since = None;
            return false;
        }

        let since = *self.high_since.get_or_insert(now_ms);
        now_ms.saturating_sub(since) >= self.stable_ms
    }

    pub fn reset(&mut self) {
        self.high_since = None;
    }
}
