//! Byte source abstraction
//!
//! The decoder never blocks: it asks how many bytes are waiting and only
//! reads when the answer is non-zero.

/// Receive side of a serial link
///
/// Implementations must not block. `read_byte` is only called after
/// `bytes_available` reported at least one byte.
pub trait ByteSource {
    /// Error type for receive operations
    type Error;

    /// Number of bytes that can be read without blocking
    fn bytes_available(&mut self) -> Result<usize, Self::Error>;

    /// Read the next byte
    fn read_byte(&mut self) -> Result<u8, Self::Error>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    type Error = S::Error;

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        (**self).bytes_available()
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        (**self).read_byte()
    }
}

/// Error from a UART-style receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadError {
    /// No byte was waiting
    Empty,
    /// Receive buffer overran before it was drained
    Overrun,
    /// Framing error (bad stop bit)
    Framing,
    /// Noise detected on the line
    Noise,
    /// Parity error
    Parity,
    /// Other error
    Other,
}
