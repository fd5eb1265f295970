//! Fixed-capacity receive queue
//!
//! A [`QueueSource`] is filled and drained through the same owner, which
//! suits host tools and tests that hand a recorded byte stream to a
//! receiver. Bytes pushed into a full queue are dropped and reported once as
//! [`ReadError::Overrun`]. For bytes produced in an interrupt, split a
//! `heapless::spsc::Queue` instead (see [`crate::spsc`]).

use heapless::Deque;

use crate::source::{ByteSource, ReadError};

/// Byte source backed by a heapless ring buffer
#[derive(Debug, Clone)]
pub struct QueueSource<const CAP: usize> {
    queue: Deque<u8, CAP>,
    overrun: bool,
}

impl<const CAP: usize> Default for QueueSource<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> QueueSource<CAP> {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
            overrun: false,
        }
    }

    /// Push a received byte
    ///
    /// Returns the byte back if the queue is full; the overrun is then
    /// reported on the next availability check.
    pub fn push(&mut self, byte: u8) -> Result<(), u8> {
        self.queue.push_back(byte).map_err(|byte| {
            self.overrun = true;
            byte
        })
    }

    /// Push as many bytes as fit
    ///
    /// Returns the number of bytes accepted.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> usize {
        let mut accepted = 0;
        for &byte in bytes {
            if self.push(byte).is_err() {
                break;
            }
            accepted += 1;
        }
        accepted
    }

    /// Number of bytes waiting
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if no bytes are waiting
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop all waiting bytes and any pending overrun
    pub fn clear(&mut self) {
        self.queue.clear();
        self.overrun = false;
    }
}

impl<const CAP: usize> ByteSource for QueueSource<CAP> {
    type Error = ReadError;

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        if self.overrun {
            self.overrun = false;
            return Err(ReadError::Overrun);
        }
        Ok(self.queue.len())
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        self.queue.pop_front().ok_or(ReadError::Empty)
    }
}
