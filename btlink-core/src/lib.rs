//! Board-agnostic receive loop for the btlink serial link
//!
//! This crate binds a [`btlink_hal::ByteSource`] to a
//! [`btlink_protocol::FrameDecoder`] and exposes the poll / handle /
//! acknowledge cycle a firmware main loop drives:
//!
//! - [`SerialReceiver::poll_and_decode`] reads available bytes without
//!   blocking and reports a ready payload length
//! - [`SerialReceiver::payload`] gives read access to the ready payload
//! - [`SerialReceiver::acknowledge`] releases it so the next frame can land
//! - [`SerialReceiver::service`] runs one full cycle against a
//!   [`PacketHandler`]

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod handler;
pub mod receiver;

pub use config::{PollMode, ReceiverConfig};
pub use handler::PacketHandler;
pub use receiver::SerialReceiver;
