//! charlink Hardware Abstraction Layer
//!
//! This crate defines the interfaces between the protocol engine and the
//! peripherals it drives but does not own: the key lines, the serial port
//! settings, the user flash area and the USB string descriptors. Board
//! support code implements these against the actual registers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  charlink-core (handlers, engine)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  charlink-hal (this crate - interfaces) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  board support (GPIO, USART, USB, LCD)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Interfaces
//!
//! - [`gpio::InputPin`] - Digital input lines
//! - [`keys::Keypad`], [`keys::KeyLines`] - Six-key keypad state
//! - [`uart::SerialConfig`] - Serial port settings and validation
//! - [`flash::UserFlash`] - 16-byte user flash area
//! - [`usb::UsbIdentity`] - USB string descriptors

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod gpio;
pub mod keys;
pub mod uart;
pub mod usb;

// Re-export key traits at crate root for convenience
pub use flash::{FlashError, UserFlash, USER_FLASH_SIZE};
pub use gpio::InputPin;
pub use keys::{KeyLines, Keypad, Keys};
pub use uart::{Parity, SerialConfig, SerialConfigError};
pub use usb::{StringIndex, UsbIdentity};
