//! Receiver configuration
//!
//! Plain `Copy` structs with sensible defaults. With the `serde` feature they
//! can be stored alongside the rest of a device's settings.

use btlink_protocol::DecoderConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How many bytes a single poll may consume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PollMode {
    /// Read at most one byte per poll; every poll is O(1)
    #[default]
    SingleByte,
    /// Read until a payload is ready or the source runs dry
    Drain,
}

/// Serial receiver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReceiverConfig {
    /// Bytes consumed per poll
    pub poll_mode: PollMode,
    /// Frame decoder settings
    pub decoder: DecoderConfig,
}

impl ReceiverConfig {
    /// Default configuration with the given poll mode
    pub fn with_poll_mode(poll_mode: PollMode) -> Self {
        Self {
            poll_mode,
            ..Self::default()
        }
    }
}
