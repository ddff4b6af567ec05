//! Character display service

/// Rows in a custom glyph bitmap
pub const GLYPH_ROWS: usize = 8;

/// Errors reported by the display service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Controller did not accept the write
    Bus,
    /// Column, row or glyph index outside the panel
    OutOfRange,
}

/// Text-mode display driven by the host commands
///
/// Positions are in character cells. Implementations translate them to
/// whatever the panel needs.
pub trait CharacterDisplay {
    /// Blank the whole screen
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Move the cursor to a cell
    fn move_cursor(&mut self, column: u8, row: u8) -> Result<(), DisplayError>;

    /// Show or hide the cursor
    fn set_cursor_visible(&mut self, visible: bool) -> Result<(), DisplayError>;

    /// Render `text` starting at a cell
    ///
    /// Bytes index the display font, they are not required to be UTF-8.
    fn draw_text(&mut self, column: u8, row: u8, text: &[u8]) -> Result<(), DisplayError>;

    /// Replace one glyph of the font
    fn set_glyph(&mut self, index: u8, bitmap: &[u8; GLYPH_ROWS]) -> Result<(), DisplayError>;

    fn set_contrast(&mut self, level: u8) -> Result<(), DisplayError>;

    fn set_backlight(&mut self, level: u8) -> Result<(), DisplayError>;
}
