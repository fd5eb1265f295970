//! Serial receiver
//!
//! Owns the byte source and the frame decoder. Each poll reads what the
//! configured [`PollMode`] allows, steps the decoder, and reports whether a
//! payload is waiting. Nothing here blocks and nothing is surfaced as an
//! error: framing faults and source read failures are counted and logged.

use btlink_hal::ByteSource;
use btlink_protocol::{DecoderState, DecoderStats, FrameDecoder, MAX_PAYLOAD_SIZE};

use crate::config::{PollMode, ReceiverConfig};
use crate::handler::PacketHandler;

/// Frame decoder driven by a byte source
#[derive(Debug)]
pub struct SerialReceiver<S, const N: usize = MAX_PAYLOAD_SIZE> {
    source: S,
    decoder: FrameDecoder<N>,
    poll_mode: PollMode,
    read_errors: u32,
}

impl<S: ByteSource, const N: usize> SerialReceiver<S, N> {
    /// Create a receiver with the default configuration
    pub fn new(source: S) -> Self {
        Self::with_config(source, ReceiverConfig::default())
    }

    /// Create a receiver with the given configuration
    pub fn with_config(source: S, config: ReceiverConfig) -> Self {
        Self {
            source,
            decoder: FrameDecoder::with_config(config.decoder),
            poll_mode: config.poll_mode,
            read_errors: 0,
        }
    }

    /// Read available input and advance the decoder
    ///
    /// Returns the payload length once a valid frame is complete. While a
    /// payload is waiting for [`Self::acknowledge`] no bytes are read and
    /// the same length is returned again.
    pub fn poll_and_decode(&mut self) -> Option<usize> {
        if let Some(len) = self.decoder.ready_len() {
            return Some(len);
        }

        match self.poll_mode {
            PollMode::SingleByte => {
                self.step();
            }
            PollMode::Drain => {
                while !self.decoder.state().is_ready() && self.step() {}
            }
        }

        self.decoder.ready_len()
    }

    /// The ready payload, if any
    pub fn payload(&self) -> Option<&[u8]> {
        self.decoder.payload()
    }

    /// Release the ready payload so the next frame can be received
    ///
    /// Has no effect unless a payload is ready.
    pub fn acknowledge(&mut self) {
        self.decoder.acknowledge();
    }

    /// Poll once and hand a ready payload to `handler`
    ///
    /// The payload is acknowledged after the handler returns. Returns `true`
    /// if a payload was dispatched.
    pub fn service<H: PacketHandler + ?Sized>(&mut self, handler: &mut H) -> bool {
        if self.poll_and_decode().is_none() {
            return false;
        }

        if let Some(payload) = self.decoder.payload() {
            trace!("dispatching {=usize} byte payload", payload.len());
            handler.handle(payload);
        }
        self.decoder.acknowledge();
        true
    }

    /// Current decoder state
    pub fn state(&self) -> DecoderState {
        self.decoder.state()
    }

    /// Active poll mode
    pub fn poll_mode(&self) -> PollMode {
        self.poll_mode
    }

    /// Change the poll mode
    pub fn set_poll_mode(&mut self, poll_mode: PollMode) {
        self.poll_mode = poll_mode;
    }

    /// The underlying decoder
    pub fn decoder(&self) -> &FrameDecoder<N> {
        &self.decoder
    }

    /// Decoder framing counters
    pub fn stats(&self) -> &DecoderStats {
        self.decoder.stats()
    }

    /// Number of failed source reads
    pub fn read_errors(&self) -> u32 {
        self.read_errors
    }

    /// Clear decoder counters and the read error count
    pub fn reset_stats(&mut self) {
        self.decoder.reset_stats();
        self.read_errors = 0;
    }

    /// Drop any frame in progress or ready
    pub fn reset(&mut self) {
        self.decoder.reset();
    }

    /// Borrow the byte source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutably borrow the byte source
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Release the byte source and decoder
    pub fn into_parts(self) -> (S, FrameDecoder<N>) {
        (self.source, self.decoder)
    }

    /// Feed one byte from the source to the decoder
    ///
    /// Returns `false` if no byte was consumed.
    fn step(&mut self) -> bool {
        match self.source.bytes_available() {
            Ok(0) => false,
            Ok(_) => match self.source.read_byte() {
                Ok(byte) => {
                    self.decoder.feed(byte);
                    true
                }
                Err(_) => {
                    self.record_read_error();
                    false
                }
            },
            Err(_) => {
                self.record_read_error();
                false
            }
        }
    }

    /// A failed read means a byte went missing, so a frame in progress
    /// cannot be trusted any more.
    fn record_read_error(&mut self) {
        self.read_errors = self.read_errors.wrapping_add(1);
        if self.decoder.state().in_frame() {
            warn!("byte source read failed, dropping frame");
            self.decoder.reset();
        } else {
            warn!("byte source read failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use btlink_hal::{QueueSource, ReadError};
    use btlink_protocol::{frame_checksum, DecoderConfig, DEFAULT_SYNC_BYTE as SYNC};
    use proptest::prelude::*;

    type Source = QueueSource<1024>;

    fn encode(sync: u8, payload: &[u8]) -> heapless::Vec<u8, 260> {
        let length = (payload.len() + 1) as u8;
        let mut frame = heapless::Vec::new();
        frame.extend_from_slice(&[sync, sync, length]).unwrap();
        frame.extend_from_slice(payload).unwrap();
        frame.push(frame_checksum(sync, length, payload)).unwrap();
        frame
    }

    fn receiver(bytes: &[u8], poll_mode: PollMode) -> SerialReceiver<Source> {
        let mut source = Source::new();
        assert_eq!(source.extend_from_slice(bytes), bytes.len());
        SerialReceiver::with_config(source, ReceiverConfig::with_poll_mode(poll_mode))
    }

    /// Source that loses the byte at `fail_at` with `error`
    struct LossySource {
        inner: Source,
        reads: usize,
        fail_at: usize,
        error: ReadError,
    }

    impl LossySource {
        fn new(bytes: &[u8], fail_at: usize, error: ReadError) -> Self {
            let mut inner = Source::new();
            assert_eq!(inner.extend_from_slice(bytes), bytes.len());
            Self {
                inner,
                reads: 0,
                fail_at,
                error,
            }
        }
    }

    impl ByteSource for LossySource {
        type Error = ReadError;

        fn bytes_available(&mut self) -> Result<usize, Self::Error> {
            self.inner.bytes_available()
        }

        fn read_byte(&mut self) -> Result<u8, Self::Error> {
            let byte = self.inner.read_byte()?;
            self.reads += 1;
            if self.reads - 1 == self.fail_at {
                return Err(self.error);
            }
            Ok(byte)
        }
    }

    fn two_frames() -> heapless::Vec<u8, 260> {
        let mut stream = encode(SYNC, &[1, 2, 3]);
        stream.extend_from_slice(&encode(SYNC, &[0x55, 0x66])).unwrap();
        stream
    }

    /// Handler that counts what it sees
    #[derive(Default)]
    struct Counter {
        packets: usize,
        bytes: usize,
    }

    impl PacketHandler for Counter {
        fn handle(&mut self, payload: &[u8]) {
            self.packets += 1;
            self.bytes += payload.len();
        }
    }

    #[test]
    fn test_single_byte_per_poll() {
        let mut rx = receiver(&[0xAA, 0xAA, 0x03, 0x10, 0x20, 0x87], PollMode::SingleByte);

        for remaining in (1..=5).rev() {
            assert_eq!(rx.poll_and_decode(), None);
            assert_eq!(rx.source().len(), remaining);
        }
        assert_eq!(rx.poll_and_decode(), Some(2));
        assert_eq!(rx.payload(), Some(&[0x10, 0x20][..]));
    }

    #[test]
    fn test_empty_source_reports_nothing() {
        let mut rx = receiver(&[], PollMode::SingleByte);
        assert_eq!(rx.poll_and_decode(), None);
        assert_eq!(rx.state(), DecoderState::AwaitingSync);
        assert_eq!(rx.read_errors(), 0);
    }

    #[test]
    fn test_ready_payload_stops_reading() {
        let mut stream = encode(SYNC, &[1, 2, 3]);
        stream.extend_from_slice(&encode(SYNC, &[4])).unwrap();
        let mut rx = receiver(&stream, PollMode::Drain);

        assert_eq!(rx.poll_and_decode(), Some(3));
        let left = rx.source().len();
        assert_eq!(left, 5);

        // Polling again does not touch the source
        assert_eq!(rx.poll_and_decode(), Some(3));
        assert_eq!(rx.source().len(), left);
        assert_eq!(rx.stats().bytes_dropped_while_ready, 0);

        rx.acknowledge();
        assert_eq!(rx.poll_and_decode(), Some(1));
        assert_eq!(rx.payload(), Some(&[4][..]));
    }

    #[test]
    fn test_poll_modes_differ_on_burst() {
        let frame = encode(SYNC, &[9, 9]);

        let mut single = receiver(&frame, PollMode::SingleByte);
        assert_eq!(single.poll_and_decode(), None);
        assert_eq!(single.state(), DecoderState::SyncByte1Seen);

        let mut drain = receiver(&frame, PollMode::Drain);
        assert_eq!(drain.poll_and_decode(), Some(2));
        assert!(drain.source().is_empty());
    }

    #[test]
    fn test_set_poll_mode() {
        let frame = encode(SYNC, &[1, 2, 3, 4]);
        let mut rx = receiver(&frame, PollMode::SingleByte);
        rx.poll_and_decode();

        rx.set_poll_mode(PollMode::Drain);
        assert_eq!(rx.poll_mode(), PollMode::Drain);
        assert_eq!(rx.poll_and_decode(), Some(4));
    }

    #[test]
    fn test_service_dispatches_and_acknowledges() {
        let mut stream = encode(SYNC, &[0x01, 0x02]);
        stream.extend_from_slice(&[0x00, 0x13]).unwrap();
        stream.extend_from_slice(&encode(SYNC, &[0x03])).unwrap();
        let mut rx = receiver(&stream, PollMode::Drain);

        let mut received: Vec<Vec<u8>> = Vec::new();
        let mut collect = |payload: &[u8]| received.push(payload.to_vec());
        while rx.service(&mut collect) {}

        assert_eq!(received, vec![vec![0x01, 0x02], vec![0x03]]);
        assert_eq!(rx.state(), DecoderState::AwaitingSync);
        assert_eq!(rx.stats().packets_ready, 2);
        assert_eq!(rx.stats().bytes_discarded, 2);
    }

    #[test]
    fn test_service_with_handler_struct() {
        let frame = encode(SYNC, &[7, 7, 7]);
        let mut rx = receiver(&frame, PollMode::SingleByte);
        let mut counter = Counter::default();

        let mut dispatched = 0;
        for _ in 0..frame.len() {
            if rx.service(&mut counter) {
                dispatched += 1;
            }
        }

        assert_eq!(dispatched, 1);
        assert_eq!(counter.packets, 1);
        assert_eq!(counter.bytes, 3);
        assert!(!rx.service(&mut counter));
    }

    #[test]
    fn test_corrupt_frame_never_dispatched() {
        let mut frame = encode(SYNC, &[0x10, 0x20]);
        let last = frame.len() - 1;
        frame[last] ^= 0xFF;
        let mut rx = receiver(&frame, PollMode::Drain);
        let mut counter = Counter::default();

        assert!(!rx.service(&mut counter));
        assert_eq!(counter.packets, 0);
        assert_eq!(rx.stats().checksum_errors, 1);
    }

    #[test]
    fn test_read_errors_counted() {
        let mut source = QueueSource::<4>::new();
        source.extend_from_slice(&[SYNC, SYNC, 0x02, 0x05, 0x00]);
        let mut rx: SerialReceiver<_> = SerialReceiver::new(source);

        // Overrun is reported instead of a byte
        assert_eq!(rx.poll_and_decode(), None);
        assert_eq!(rx.read_errors(), 1);
        assert_eq!(rx.state(), DecoderState::AwaitingSync);

        rx.reset_stats();
        assert_eq!(rx.read_errors(), 0);
    }

    #[test]
    fn test_lost_byte_costs_one_frame() {
        let errors = [
            ReadError::Framing,
            ReadError::Noise,
            ReadError::Parity,
            ReadError::Overrun,
            ReadError::Other,
        ];

        for error in errors {
            // Byte 4 is the second payload byte of the first frame
            let source = LossySource::new(&two_frames(), 4, error);
            let mut rx: SerialReceiver<_> = SerialReceiver::new(source);

            let mut received: Vec<Vec<u8>> = Vec::new();
            for _ in 0..64 {
                rx.service(&mut |payload: &[u8]| received.push(payload.to_vec()));
            }

            assert_eq!(received, vec![vec![0x55, 0x66]]);
            assert_eq!(rx.read_errors(), 1);
            assert_eq!(rx.stats().framing_errors(), 0);
        }
    }

    #[test]
    fn test_read_error_while_idle_keeps_state() {
        // Byte 0 lost: nothing was in progress, the rest of the frame is noise
        let source = LossySource::new(&two_frames(), 0, ReadError::Noise);
        let mut rx: SerialReceiver<_> = SerialReceiver::new(source);

        assert_eq!(rx.poll_and_decode(), None);
        assert_eq!(rx.read_errors(), 1);
        assert_eq!(rx.state(), DecoderState::AwaitingSync);
    }

    #[test]
    fn test_drain_stops_at_read_error_then_recovers() {
        let source = LossySource::new(&two_frames(), 4, ReadError::Parity);
        let config = ReceiverConfig::with_poll_mode(PollMode::Drain);
        let mut rx: SerialReceiver<_> = SerialReceiver::with_config(source, config);

        // First drain ends at the lost byte with the frame dropped
        assert_eq!(rx.poll_and_decode(), None);
        assert_eq!(rx.read_errors(), 1);
        assert_eq!(rx.state(), DecoderState::AwaitingSync);
        assert_eq!(rx.source().inner.len(), two_frames().len() - 5);

        // Next drain skips the tail of the broken frame and lands the second
        assert_eq!(rx.poll_and_decode(), Some(2));
        assert_eq!(rx.payload(), Some(&[0x55, 0x66][..]));
        assert_eq!(rx.stats().framing_errors(), 0);
    }

    #[test]
    fn test_receiver_drains_spsc_consumer() {
        let mut queue: heapless::spsc::Queue<u8, 16> = heapless::spsc::Queue::new();
        let (mut producer, consumer) = queue.split();
        let mut rx: SerialReceiver<_> = SerialReceiver::new(consumer);
        let mut counter = Counter::default();

        // Bytes trickle in between polls, as they would from an RX interrupt
        for &byte in two_frames().iter() {
            producer.enqueue(byte).unwrap();
            rx.service(&mut counter);
        }

        assert_eq!(counter.packets, 2);
        assert_eq!(counter.bytes, 5);
        assert_eq!(rx.source().len(), 0);
        assert_eq!(rx.read_errors(), 0);
    }

    #[test]
    fn test_custom_sync_and_capacity() {
        let config = ReceiverConfig {
            poll_mode: PollMode::Drain,
            decoder: DecoderConfig::with_sync_byte(0x55),
        };
        let mut source = Source::new();
        source.extend_from_slice(&encode(0x55, &[1, 2, 3, 4, 5]));
        source.extend_from_slice(&encode(0x55, &[1, 2]));
        let mut rx = SerialReceiver::<Source, 4>::with_config(source, config);

        // Five bytes exceed a four byte buffer
        assert_eq!(rx.poll_and_decode(), Some(2));
        assert_eq!(rx.stats().length_errors, 1);
        assert_eq!(rx.decoder().config().sync_byte, 0x55);
    }

    #[test]
    fn test_into_parts() {
        let frame = encode(SYNC, &[1]);
        let mut rx = receiver(&frame, PollMode::Drain);
        rx.poll_and_decode();
        rx.source_mut().push(0x42).unwrap();

        let (source, decoder) = rx.into_parts();
        assert_eq!(source.len(), 1);
        assert_eq!(decoder.payload(), Some(&[1][..]));
    }

    #[test]
    fn test_reset_drops_ready_payload() {
        let frame = encode(SYNC, &[1, 2]);
        let mut rx = receiver(&frame, PollMode::Drain);
        assert_eq!(rx.poll_and_decode(), Some(2));

        rx.reset();
        assert_eq!(rx.payload(), None);
        assert_eq!(rx.poll_and_decode(), None);
    }

    proptest! {
        #[test]
        fn test_poll_modes_deliver_same_payloads(
            payloads in proptest::collection::vec(
                proptest::collection::vec(any::<u8>(), 1..=MAX_PAYLOAD_SIZE),
                0..8,
            ),
            junk in proptest::collection::vec(0u8..0xAA, 0..4),
        ) {
            let mut stream: Vec<u8> = Vec::new();
            for payload in &payloads {
                stream.extend_from_slice(&junk);
                stream.extend_from_slice(&encode(SYNC, payload));
            }

            let mut single = receiver(&stream, PollMode::SingleByte);
            let mut single_out: Vec<Vec<u8>> = Vec::new();
            for _ in 0..=stream.len() {
                single.service(&mut |payload: &[u8]| single_out.push(payload.to_vec()));
            }

            let mut drain = receiver(&stream, PollMode::Drain);
            let mut drain_out: Vec<Vec<u8>> = Vec::new();
            while drain.service(&mut |payload: &[u8]| drain_out.push(payload.to_vec())) {}

            prop_assert_eq!(&single_out, &payloads);
            prop_assert_eq!(&drain_out, &payloads);
            prop_assert!(single.source().is_empty());
            prop_assert!(drain.source().is_empty());
        }
    }
}
