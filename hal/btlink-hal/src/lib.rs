//! btlink Hardware Abstraction Layer
//!
//! This crate defines the receive side of a serial link as seen by the
//! frame decoder: something that can report how many bytes are waiting and
//! hand them over one at a time. Chip-specific UART drivers (or a software
//! serial port behind a Bluetooth bridge) implement [`ByteSource`] directly,
//! or through the [`IoSource`] adapter when they already speak `embedded-io`.
//! Bytes captured in an RX interrupt reach the decoder through the consumer
//! half of a `heapless::spsc::Queue`; [`QueueSource`] serves host tools and
//! tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  btlink-core (SerialReceiver)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  btlink-hal (this crate - ByteSource)   │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ spsc Consumer │       │   IoSource    │
//! │  (RX ISR)     │       │ (embedded-io) │
//! └───────────────┘       └───────────────┘
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod io;
pub mod queue;
pub mod source;
pub mod spsc;

pub use io::{IoSource, IoSourceError};
pub use queue::QueueSource;
pub use source::{ByteSource, ReadError};
