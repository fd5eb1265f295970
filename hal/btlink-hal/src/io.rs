//! `embedded-io` adapter
//!
//! Most HAL UART drivers already implement [`embedded_io::Read`] and
//! [`embedded_io::ReadReady`]. [`IoSource`] turns such a driver into a
//! [`ByteSource`]. `ReadReady` only says whether data is waiting, so the
//! adapter reports at most one byte available at a time.

use embedded_io::{Read, ReadReady};

use crate::source::ByteSource;

/// Error from an [`IoSource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoSourceError<E> {
    /// Underlying driver error
    Io(E),
    /// Reader returned zero bytes after reporting ready
    EndOfStream,
}

/// Byte source wrapping an `embedded-io` reader
#[derive(Debug)]
pub struct IoSource<T> {
    inner: T,
}

impl<T> IoSource<T> {
    /// Wrap a reader
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Borrow the wrapped reader
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Release the wrapped reader
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read + ReadReady> ByteSource for IoSource<T> {
    type Error = IoSourceError<T::Error>;

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        let ready = self.inner.read_ready().map_err(IoSourceError::Io)?;
        Ok(usize::from(ready))
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        match self.inner.read(&mut buf).map_err(IoSourceError::Io)? {
            0 => Err(IoSourceError::EndOfStream),
            _ => Ok(buf[0]),
        }
    }
}
