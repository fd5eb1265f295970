//! Interrupt-to-main-loop byte handoff
//!
//! An RX interrupt owns the [`Producer`] half of a [`heapless::spsc::Queue`]
//! and the receiver owns the [`Consumer`] half. Neither side needs a lock.
//! A full queue is seen by the producer: `enqueue` hands the byte back and
//! the interrupt decides how to account for the overrun.
//!
//! ```ignore
//! let mut rx_queue: Queue<u8, 128> = Queue::new();
//! let (producer, consumer) = rx_queue.split();
//! // move `producer` into the UART interrupt, `consumer` into the receiver
//! let mut rx: SerialReceiver<_> = SerialReceiver::new(consumer);
//! ```
//!
//! [`Producer`]: heapless::spsc::Producer

use heapless::spsc::Consumer;

use crate::source::{ByteSource, ReadError};

impl<const N: usize> ByteSource for Consumer<'_, u8, N> {
    type Error = ReadError;

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        Ok(self.len())
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        self.dequeue().ok_or(ReadError::Empty)
    }
}
