//! Decoder configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sync byte used when none is configured
pub const DEFAULT_SYNC_BYTE: u8 = 0xAA;

/// Frame decoder configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecoderConfig {
    /// Marker byte sent twice at the start of every frame
    pub sync_byte: u8,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            sync_byte: DEFAULT_SYNC_BYTE,
        }
    }
}

impl DecoderConfig {
    /// Configuration with a custom sync byte
    pub const fn with_sync_byte(sync_byte: u8) -> Self {
        Self { sync_byte }
    }
}
