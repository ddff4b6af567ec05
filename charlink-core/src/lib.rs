//! Device logic for the charlink display controller
//!
//! This crate contains everything above the wire protocol that does not
//! depend on a particular board:
//!
//! - Display service trait
//! - Command handlers for the full command set
//! - Keypad poll state and unsolicited key reports
//! - Protocol engine driving the decoder for each transport
//! - Configuration types and TOML loading

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod engine;
pub mod handlers;
pub mod keypad;
pub mod traits;

pub use config::{ConfigError, DeviceConfig};
pub use engine::{Endpoint, Engine};
pub use handlers::Device;
pub use keypad::{KeyEvent, KeyReporter, KeypadReport, PollState, KEY_ACTIVITY_REPORT};
pub use traits::{CharacterDisplay, DisplayError};
