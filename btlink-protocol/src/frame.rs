//! Frame decoding for the btlink serial protocol.
//!
//! Frame format:
//! - SYNC (1 byte): synchronization byte, 0xAA by default
//! - SYNC (1 byte): the same byte again, confirming a frame start
//! - LEN (1 byte): payload length + 1 (2..=MAX_PAYLOAD_SIZE + 1)
//! - PAYLOAD (LEN - 1 bytes): opaque data
//! - CHECKSUM (1 byte): wrapping sum of both SYNC bytes, LEN and all PAYLOAD bytes
//!
//! The decoder advances one byte at a time and holds a completed payload
//! until the handler acknowledges it.

use crate::config::DecoderConfig;
use crate::stats::{DecoderStats, FramingError};

/// Default payload capacity in bytes
pub const MAX_PAYLOAD_SIZE: usize = 64;

/// Compute the checksum byte for a frame
///
/// Sum modulo 256 of the two sync bytes, the length byte and the payload.
pub fn frame_checksum(sync_byte: u8, length: u8, payload: &[u8]) -> u8 {
    payload.iter().fold(
        sync_byte.wrapping_add(sync_byte).wrapping_add(length),
        |sum, &byte| sum.wrapping_add(byte),
    )
}

/// Frame decoder states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecoderState {
    /// Hunting for the first SYNC byte
    AwaitingSync,
    /// Got one SYNC, waiting for the second
    SyncByte1Seen,
    /// Got both SYNC bytes, waiting for LEN
    LengthReceived,
    /// Reading payload bytes
    AccumulatingPayload,
    /// Payload complete, waiting for CHECKSUM
    ChecksumPending,
    /// Valid payload held until acknowledged
    PayloadReady,
}

impl DecoderState {
    /// Check if the decoder is between frames
    pub fn is_idle(&self) -> bool {
        matches!(self, DecoderState::AwaitingSync)
    }

    /// Check if a payload is waiting for the handler
    pub fn is_ready(&self) -> bool {
        matches!(self, DecoderState::PayloadReady)
    }

    /// Check if a frame has been partially received
    pub fn in_frame(&self) -> bool {
        !self.is_idle() && !self.is_ready()
    }
}

/// State machine for decoding incoming frames
///
/// `N` is the payload capacity; frames claiming more than `N` payload bytes
/// are rejected. The buffer is a fixed array overwritten in place, so the
/// decoder never allocates.
#[derive(Debug, Clone)]
pub struct FrameDecoder<const N: usize = MAX_PAYLOAD_SIZE> {
    config: DecoderConfig,
    state: DecoderState,
    payload: [u8; N],
    expected_len: Option<usize>,
    fill: usize,
    checksum: u8,
    stats: DecoderStats,
}

impl<const N: usize> Default for FrameDecoder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FrameDecoder<N> {
    /// Payload capacity in bytes
    pub const CAPACITY: usize = N;

    // LEN = N + 1 must fit in the length byte
    const CAPACITY_CHECK: () = assert!(
        N >= 1 && N < u8::MAX as usize,
        "payload capacity must be between 1 and 254 bytes"
    );

    /// Create a decoder using the default sync byte
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    /// Create a decoder with the given configuration
    pub fn with_config(config: DecoderConfig) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_CHECK;

        Self {
            config,
            state: DecoderState::AwaitingSync,
            payload: [0; N],
            expected_len: None,
            fill: 0,
            checksum: 0,
            stats: DecoderStats::default(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Current state
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Payload length claimed by the frame in progress, if any
    pub fn expected_len(&self) -> Option<usize> {
        self.expected_len
    }

    /// Payload bytes received so far for the frame in progress
    pub fn fill_count(&self) -> usize {
        self.fill
    }

    /// Framing counters
    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    /// Clear the framing counters
    pub fn reset_stats(&mut self) {
        self.stats = DecoderStats::default();
    }

    /// Length of the ready payload, or `None` if no payload is ready
    pub fn ready_len(&self) -> Option<usize> {
        match self.state {
            DecoderState::PayloadReady => self.expected_len,
            _ => None,
        }
    }

    /// The validated payload
    ///
    /// Only available while the decoder is in [`DecoderState::PayloadReady`].
    pub fn payload(&self) -> Option<&[u8]> {
        self.ready_len().map(|len| &self.payload[..len])
    }

    /// Feed a single byte to the decoder
    ///
    /// Returns the payload length when a valid frame is complete, `None`
    /// otherwise. Malformed input never produces an error; the decoder drops
    /// the frame and goes back to hunting for sync. A byte fed while a
    /// payload is waiting for acknowledgment is ignored.
    pub fn feed(&mut self, byte: u8) -> Option<usize> {
        let sync = self.config.sync_byte;

        match self.state {
            DecoderState::AwaitingSync => {
                if byte == sync {
                    self.state = DecoderState::SyncByte1Seen;
                } else {
                    self.stats.bytes_discarded = self.stats.bytes_discarded.wrapping_add(1);
                }
            }
            DecoderState::SyncByte1Seen => {
                if byte == sync {
                    self.state = DecoderState::LengthReceived;
                } else {
                    self.resync(FramingError::BadSync);
                }
            }
            DecoderState::LengthReceived => self.accept_length(byte),
            DecoderState::AccumulatingPayload => {
                // fill < expected_len <= N while accumulating
                self.payload[self.fill] = byte;
                self.fill += 1;
                self.checksum = self.checksum.wrapping_add(byte);
                if Some(self.fill) == self.expected_len {
                    self.state = DecoderState::ChecksumPending;
                }
            }
            DecoderState::ChecksumPending => {
                if byte == self.checksum {
                    self.state = DecoderState::PayloadReady;
                    self.stats.packets_ready = self.stats.packets_ready.wrapping_add(1);
                    trace!("frame ready: {=usize} bytes", self.fill);
                } else {
                    self.resync(FramingError::ChecksumMismatch {
                        expected: self.checksum,
                        received: byte,
                    });
                }
            }
            DecoderState::PayloadReady => {
                self.stats.bytes_dropped_while_ready =
                    self.stats.bytes_dropped_while_ready.wrapping_add(1);
            }
        }

        self.ready_len()
    }

    /// Feed bytes until a frame completes
    ///
    /// Returns the number of bytes consumed. Bytes after a completed frame
    /// are not consumed; check [`Self::ready_len`] for the outcome.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> usize {
        let mut consumed = 0;
        for &byte in bytes {
            if self.state.is_ready() {
                break;
            }
            self.feed(byte);
            consumed += 1;
        }
        consumed
    }

    /// Release the ready payload
    ///
    /// Returns the decoder to [`DecoderState::AwaitingSync`] so the next
    /// frame can be received. Has no effect unless a payload is ready.
    pub fn acknowledge(&mut self) {
        if !self.state.is_ready() {
            trace!("acknowledge with no payload ready ignored");
            return;
        }
        self.expected_len = None;
        self.fill = 0;
        self.state = DecoderState::AwaitingSync;
    }

    /// Drop any frame in progress or ready and hunt for sync again
    pub fn reset(&mut self) {
        self.state = DecoderState::AwaitingSync;
        self.expected_len = None;
        self.fill = 0;
        self.checksum = 0;
    }

    fn accept_length(&mut self, length: u8) {
        match usize::from(length).checked_sub(1) {
            Some(payload_len) if (1..=N).contains(&payload_len) => {
                let sync = self.config.sync_byte;
                self.expected_len = Some(payload_len);
                self.fill = 0;
                self.checksum = sync.wrapping_add(sync).wrapping_add(length);
                self.state = DecoderState::AccumulatingPayload;
            }
            _ => self.resync(FramingError::InvalidLength(length)),
        }
    }

    fn resync(&mut self, error: FramingError) {
        debug!("frame dropped: {}", error);
        self.stats.record(error);
        self.reset();
    }
}
