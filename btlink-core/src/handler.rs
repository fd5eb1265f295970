//! Payload handler abstraction

/// Consumer of validated payloads
///
/// The payload slice is only valid for the duration of the call; the
/// receiver acknowledges the frame as soon as `handle` returns.
pub trait PacketHandler {
    /// Process one payload
    fn handle(&mut self, payload: &[u8]);
}

impl<F: FnMut(&[u8])> PacketHandler for F {
    fn handle(&mut self, payload: &[u8]) {
        self(payload)
    }
}
