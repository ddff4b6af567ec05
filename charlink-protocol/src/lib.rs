//! Host Link Command Protocol
//!
//! This crate implements the framed request/response protocol spoken by the
//! charlink display controller over its serial port and its USB bulk
//! endpoint. Both links carry the same frames:
//!
//! ```text
//! ┌─────────┬──────┬─────────────┬──────────┐
//! │ COMMAND │ SIZE │ PAYLOAD     │ CRC16    │
//! │ 1B      │ 1B   │ 0–255B      │ 2B (LE)  │
//! └─────────┴──────┴─────────────┴──────────┘
//! ```
//!
//! Received bytes land in an interrupt-safe [`RingBuffer`], are staged by the
//! main loop and handed to the [`FrameDecoder`], which realigns on noise by
//! dropping one byte at a time and dispatches at most one valid command per
//! pass to a [`CommandHandler`]. Handlers answer exactly once through a
//! [`Responder`].

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod command;
pub mod crc;
pub mod decoder;
pub mod encoder;
pub mod frame;
pub mod ring;
pub mod stats;
pub mod transport;

pub use command::{CommandDescriptor, CommandHandler, CommandId, CommandTable, COMMANDS};
pub use decoder::{DecodeOutcome, FrameDecoder, Staging, STAGING_SIZE};
pub use encoder::{Responder, Sent};
pub use frame::{Frame, FrameBuf, FrameError, MAX_PAYLOAD_SIZE, MIN_FRAME_SIZE, RESPONSE_FLAG};
pub use ring::{Overruns, RingBuffer, RING_SIZE};
pub use stats::ProtocolStats;
pub use transport::{Inbound, Outbound, Port, PortTransport, Transport, TxHardware, TxPump};
