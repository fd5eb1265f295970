//! Framing fault bookkeeping
//!
//! The decoder never reports a framing fault to its caller. These counters
//! are the only place faults become visible, for link-quality diagnostics.

/// A framing fault that caused the decoder to resynchronize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramingError {
    /// First sync byte was not followed by a second one
    BadSync,
    /// Length byte outside the accepted range
    InvalidLength(u8),
    /// Checksum byte did not match the running sum
    ChecksumMismatch {
        /// Running checksum computed by the decoder
        expected: u8,
        /// Checksum byte received on the wire
        received: u8,
    },
}

/// Decoder counters
///
/// All counters wrap on overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecoderStats {
    /// Packets that passed the checksum
    pub packets_ready: u32,
    /// Non-sync bytes skipped while hunting for a frame start
    pub bytes_discarded: u32,
    /// Frames dropped at the second sync byte
    pub sync_errors: u32,
    /// Frames dropped for an out-of-range length byte
    pub length_errors: u32,
    /// Frames dropped for a checksum mismatch
    pub checksum_errors: u32,
    /// Bytes fed while a payload was waiting for acknowledgment
    pub bytes_dropped_while_ready: u32,
}

impl DecoderStats {
    /// Record a framing fault
    pub fn record(&mut self, error: FramingError) {
        let counter = match error {
            FramingError::BadSync => &mut self.sync_errors,
            FramingError::InvalidLength(_) => &mut self.length_errors,
            FramingError::ChecksumMismatch { .. } => &mut self.checksum_errors,
        };
        *counter = counter.wrapping_add(1);
    }

    /// Total framing faults of any kind
    pub fn framing_errors(&self) -> u32 {
        self.sync_errors
            .wrapping_add(self.length_errors)
            .wrapping_add(self.checksum_errors)
    }
}
