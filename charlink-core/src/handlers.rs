//! Command handlers.
//!
//! Every handler answers exactly once. Commands that drive the panel
//! acknowledge first and then touch the display, so a slow or failing panel
//! never delays or suppresses the reply. Display and flash failures are
//! logged and otherwise ignored; the protocol has no way to report them.

use charlink_hal::flash::read_or_blank;
use charlink_hal::{Keypad, Keys, UserFlash, USER_FLASH_SIZE};
use charlink_protocol::{CommandHandler, CommandId, FrameBuf, Responder, Sent};

use crate::config::{DeviceConfig, DisplaySettings};
use crate::keypad::{KeyEvent, KeyReporter, PollState, MAX_KEY_EVENTS};
use crate::traits::{CharacterDisplay, DisplayError, GLYPH_ROWS};

/// Column and row bytes ahead of the text in send-data
const TEXT_OFFSET: usize = 2;

/// Longest text send-data can carry
pub const MAX_TEXT_LEN: usize = 20;

/// ROM id bytes in a read-dow reply
const DOW_ROM_ID_LEN: usize = 8;

/// Services and per-device state the handlers operate on
pub struct Device<D, K, F> {
    display: D,
    keypad: K,
    flash: F,
    poll: PollState,
    reporter: KeyReporter,
    settings: DisplaySettings,
}

impl<D, K, F> Device<D, K, F>
where
    D: CharacterDisplay,
    K: Keypad,
    F: UserFlash,
{
    /// Device with factory settings; nothing is sent to the panel
    pub fn new(display: D, keypad: K, flash: F) -> Self {
        Self {
            display,
            keypad,
            flash,
            poll: PollState::new(),
            reporter: KeyReporter::new(),
            settings: DisplaySettings::default(),
        }
    }

    /// Device with `config` applied to the panel and the key reporter
    pub fn with_config(display: D, keypad: K, flash: F, config: &DeviceConfig) -> Self {
        let mut device = Self::new(display, keypad, flash);
        device
            .reporter
            .configure(config.keypad.press_keys(), config.keypad.release_keys());
        device.apply_contrast(config.display.contrast);
        device.apply_backlight(config.display.backlight);
        device
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn keypad_mut(&mut self) -> &mut K {
        &mut self.keypad
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    /// Current panel settings
    pub fn settings(&self) -> DisplaySettings {
        self.settings
    }

    pub fn reporter(&self) -> &KeyReporter {
        &self.reporter
    }

    /// Sample the keypad for unsolicited reports
    pub fn key_events(&mut self) -> heapless::Vec<KeyEvent, MAX_KEY_EVENTS> {
        let keys = self.keypad.read();
        self.reporter.update(keys)
    }

    fn drive(&mut self, op: impl FnOnce(&mut D) -> Result<(), DisplayError>) {
        if let Err(e) = op(&mut self.display) {
            warn!("display: {}", e);
        }
    }

    fn apply_contrast(&mut self, level: u8) {
        self.settings.contrast = level;
        self.drive(|d| d.set_contrast(level));
    }

    fn apply_backlight(&mut self, level: u8) {
        self.settings.backlight = level;
        self.drive(|d| d.set_backlight(level));
    }

    fn send_text(&mut self, frame: &mut FrameBuf, responder: Responder<'_>) -> Sent {
        let (column, row) = (arg(frame, 0), arg(frame, 1));
        let mut text = [0u8; MAX_TEXT_LEN];
        let len = copy_args(frame, TEXT_OFFSET, &mut text);

        let sent = ack(frame, responder);
        self.drive(|d| d.draw_text(column, row, &text[..len]));
        sent
    }

    fn set_glyph(&mut self, frame: &mut FrameBuf, responder: Responder<'_>) -> Sent {
        let index = arg(frame, 0);
        let mut bitmap = [0u8; GLYPH_ROWS];
        copy_args(frame, 1, &mut bitmap);

        let sent = ack(frame, responder);
        self.drive(|d| d.set_glyph(index, &bitmap));
        sent
    }

    fn read_keypad(&mut self, frame: &mut FrameBuf, responder: Responder<'_>) -> Sent {
        let report = self.poll.poll(self.keypad.read());
        frame
            .resize_payload(3)
            .copy_from_slice(&report.to_bytes());
        responder.device_response(frame)
    }

    fn read_dow(&mut self, frame: &mut FrameBuf, responder: Responder<'_>) -> Sent {
        // No 1-Wire bus: echo the index with an all-zero ROM id
        let payload = frame.resize_payload(1 + DOW_ROM_ID_LEN as u8);
        payload[1..].fill(0);
        responder.device_response(frame)
    }

    fn read_flash(&mut self, frame: &mut FrameBuf, responder: Responder<'_>) -> Sent {
        let data = read_or_blank(&mut self.flash).unwrap_or_else(|e| {
            warn!("user flash read failed: {}", e);
            [0u8; USER_FLASH_SIZE]
        });
        frame
            .resize_payload(USER_FLASH_SIZE as u8)
            .copy_from_slice(&data);
        responder.device_response(frame)
    }

    fn write_flash(&mut self, frame: &mut FrameBuf, responder: Responder<'_>) -> Sent {
        let mut data = [0u8; USER_FLASH_SIZE];
        copy_args(frame, 0, &mut data);
        if let Err(e) = self.flash.write(&data) {
            warn!("user flash write failed: {}", e);
        }
        ack(frame, responder)
    }
}

/// Payload byte `index`, or 0 past the end
///
/// The standard command table guarantees every byte a handler reads; a
/// narrower custom table reads missing bytes as zeros instead of panicking.
fn arg(frame: &FrameBuf, index: usize) -> u8 {
    frame.payload().get(index).copied().unwrap_or(0)
}

/// Copy payload bytes from `offset` into `out`, returns how many were there
fn copy_args(frame: &FrameBuf, offset: usize, out: &mut [u8]) -> usize {
    let src = frame.payload().get(offset..).unwrap_or(&[]);
    let len = src.len().min(out.len());
    out[..len].copy_from_slice(&src[..len]);
    len
}

/// Empty device reply
fn ack(frame: &mut FrameBuf, responder: Responder<'_>) -> Sent {
    frame.clear_payload();
    responder.device_response(frame)
}

impl<D, K, F> CommandHandler for Device<D, K, F>
where
    D: CharacterDisplay,
    K: Keypad,
    F: UserFlash,
{
    fn handle(&mut self, command: CommandId, frame: &mut FrameBuf, responder: Responder<'_>) -> Sent {
        match command {
            CommandId::Ping => responder.device_response(frame),
            CommandId::ClearScreen => {
                let sent = ack(frame, responder);
                self.drive(|d| d.clear());
                sent
            }
            CommandId::SendData => self.send_text(frame, responder),
            CommandId::SetCursorPosition => {
                let (column, row) = (arg(frame, 0), arg(frame, 1));
                let sent = ack(frame, responder);
                self.drive(|d| d.move_cursor(column, row));
                sent
            }
            CommandId::SetCursorStyle => {
                let visible = arg(frame, 0) != 0;
                let sent = ack(frame, responder);
                self.drive(|d| d.set_cursor_visible(visible));
                sent
            }
            CommandId::SetContrast => {
                let level = arg(frame, 0);
                let sent = ack(frame, responder);
                self.apply_contrast(level);
                sent
            }
            CommandId::SetBacklight => {
                let level = arg(frame, 0);
                let sent = ack(frame, responder);
                self.apply_backlight(level);
                sent
            }
            CommandId::SetSpecialCharacter => self.set_glyph(frame, responder),
            CommandId::ReadKeypad => self.read_keypad(frame, responder),
            CommandId::ConfigureKeyReport => {
                let press = Keys::from_bits(arg(frame, 0));
                let release = Keys::from_bits(arg(frame, 1));
                self.reporter.configure(press, release);
                ack(frame, responder)
            }
            CommandId::ReadDow => self.read_dow(frame, responder),
            CommandId::ReadUserFlash => self.read_flash(frame, responder),
            CommandId::WriteUserFlash => self.write_flash(frame, responder),
            CommandId::Reset
            | CommandId::SetFan
            | CommandId::ConfigureGpio
            | CommandId::Undocumented08 => ack(frame, responder),
        }
    }
}
