//! Service traits
//!
//! Interfaces the command handlers drive. Keypad and flash live in
//! `charlink-hal`; the display is defined here because its operations
//! mirror the command set rather than any bus.

pub mod display;

pub use display::{CharacterDisplay, DisplayError, GLYPH_ROWS};
