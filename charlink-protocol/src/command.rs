//! Command registry.
//!
//! The table is a small fixed list searched linearly by id. Each entry gives
//! the accepted payload size range; frames outside it are treated as noise.

use crate::encoder::{Responder, Sent};
use crate::frame::FrameBuf;

/// Commands the device understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CommandId {
    Ping = 0x00,
    WriteUserFlash = 0x02,
    ReadUserFlash = 0x03,
    Reset = 0x05,
    ClearScreen = 0x06,
    Undocumented08 = 0x08,
    SetSpecialCharacter = 0x09,
    SetCursorPosition = 0x0B,
    SetCursorStyle = 0x0C,
    SetContrast = 0x0D,
    SetBacklight = 0x0E,
    SetFan = 0x11,
    ReadDow = 0x12,
    ConfigureKeyReport = 0x17,
    ReadKeypad = 0x18,
    SendData = 0x1F,
    ConfigureGpio = 0x22,
}

impl CommandId {
    /// Wire value
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Outcome of checking a declared payload size against a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeCheck {
    Accepted,
    BelowMinimum,
    AboveMaximum,
}

/// One registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandDescriptor {
    pub command: CommandId,
    pub min_payload: u8,
    pub max_payload: u8,
}

impl CommandDescriptor {
    /// Command with exactly `size` payload bytes
    pub const fn fixed(command: CommandId, size: u8) -> Self {
        Self {
            command,
            min_payload: size,
            max_payload: size,
        }
    }

    /// Command accepting `min..=max` payload bytes
    pub const fn variadic(command: CommandId, min: u8, max: u8) -> Self {
        Self {
            command,
            min_payload: min,
            max_payload: max,
        }
    }

    pub const fn id(&self) -> u8 {
        self.command.code()
    }

    pub fn check_size(&self, payload_size: u8) -> SizeCheck {
        if payload_size > self.max_payload {
            SizeCheck::AboveMaximum
        } else if payload_size < self.min_payload {
            SizeCheck::BelowMinimum
        } else {
            SizeCheck::Accepted
        }
    }
}

/// The device's command set, in lookup order
pub const COMMANDS: [CommandDescriptor; 17] = [
    CommandDescriptor::variadic(CommandId::Ping, 0, 255),
    CommandDescriptor::fixed(CommandId::ClearScreen, 0),
    CommandDescriptor::variadic(CommandId::SendData, 3, 22),
    CommandDescriptor::fixed(CommandId::SetCursorPosition, 2),
    CommandDescriptor::fixed(CommandId::SetCursorStyle, 1),
    CommandDescriptor::fixed(CommandId::SetContrast, 1),
    CommandDescriptor::fixed(CommandId::SetBacklight, 1),
    CommandDescriptor::fixed(CommandId::ReadKeypad, 0),
    CommandDescriptor::fixed(CommandId::ConfigureKeyReport, 2),
    CommandDescriptor::fixed(CommandId::ReadDow, 1),
    CommandDescriptor::fixed(CommandId::SetSpecialCharacter, 9),
    CommandDescriptor::variadic(CommandId::Undocumented08, 0, 255),
    CommandDescriptor::fixed(CommandId::ReadUserFlash, 16),
    CommandDescriptor::fixed(CommandId::Reset, 3),
    CommandDescriptor::fixed(CommandId::SetFan, 4),
    CommandDescriptor::fixed(CommandId::WriteUserFlash, 16),
    CommandDescriptor::variadic(CommandId::ConfigureGpio, 0, 255),
];

/// Read-only view of a command registry
#[derive(Debug, Clone, Copy)]
pub struct CommandTable<'a> {
    entries: &'a [CommandDescriptor],
}

impl CommandTable<'static> {
    /// The built-in command set
    pub const fn standard() -> Self {
        Self { entries: &COMMANDS }
    }
}

impl<'a> CommandTable<'a> {
    pub const fn new(entries: &'a [CommandDescriptor]) -> Self {
        Self { entries }
    }

    /// Linear lookup by wire id
    pub fn find(&self, id: u8) -> Option<&'a CommandDescriptor> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a CommandDescriptor> {
        self.entries.iter()
    }
}

/// Executes validated commands
///
/// `frame` holds the request body (header + payload, checksum already
/// stripped). The implementation rewrites it into its reply and hands it to
/// `responder`, which can only be used once, so every dispatched command
/// produces exactly one response.
pub trait CommandHandler {
    fn handle(&mut self, command: CommandId, frame: &mut FrameBuf, responder: Responder<'_>)
        -> Sent;
}
