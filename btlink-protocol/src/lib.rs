//! btlink Serial Frame Protocol
//!
//! This crate turns the raw byte stream of a point-to-point serial link (for
//! example a microcontroller behind a Bluetooth-serial bridge) into discrete,
//! checksum-validated payloads.
//!
//! # Protocol Overview
//!
//! Every packet uses the same binary frame format:
//! ```text
//! ┌──────┬──────┬─────┬──────────────────┬──────────┐
//! │ SYNC │ SYNC │ LEN │ PAYLOAD          │ CHECKSUM │
//! │ 1B   │ 1B   │ 1B  │ LEN-1 bytes      │ 1B       │
//! └──────┴──────┴─────┴──────────────────┴──────────┘
//! ```
//!
//! The checksum is the 8-bit wrapping sum of both sync bytes, the length byte
//! and every payload byte. Any framing fault (bad sync, invalid length,
//! checksum mismatch) silently drops the packet and the decoder goes back to
//! hunting for sync. Faults are counted in [`DecoderStats`], never returned.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod frame;
pub mod stats;

pub use config::{DecoderConfig, DEFAULT_SYNC_BYTE};
pub use frame::{frame_checksum, DecoderState, FrameDecoder, MAX_PAYLOAD_SIZE};
pub use stats::{DecoderStats, FramingError};
