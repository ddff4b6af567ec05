//! Serial port settings
//!
//! The host link always runs 8 data bits and 1 stop bit. Parity, when
//! enabled, is carried in a ninth bit.

#[cfg(feature = "serde")]
use serde::Deserialize;

/// Highest baud rate the USART can be programmed for
pub const MAX_BAUDRATE: u32 = 4_500_000;

/// Factory baud rate
pub const DEFAULT_BAUDRATE: u32 = 115_200;

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(rename_all = "lowercase"))]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
}

impl Parity {
    /// Decode the numeric parity code used by configuration tools
    /// (0 = none, 1 = odd, 2 = even)
    pub fn from_code(code: u8) -> Result<Self, SerialConfigError> {
        match code {
            0 => Ok(Parity::None),
            1 => Ok(Parity::Odd),
            2 => Ok(Parity::Even),
            _ => Err(SerialConfigError::BadParity),
        }
    }
}

/// Errors from serial port configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialConfigError {
    /// Baud rate is zero or above what the USART supports
    BadSpeed,
    /// Parity code not recognised
    BadParity,
}

/// Serial port configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct SerialConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Parity mode
    pub parity: Parity,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baudrate: DEFAULT_BAUDRATE,
            parity: Parity::None,
        }
    }
}

impl SerialConfig {
    /// Create a validated configuration
    pub fn new(baudrate: u32, parity: Parity) -> Result<Self, SerialConfigError> {
        let config = Self { baudrate, parity };
        config.validate()?;
        Ok(config)
    }

    /// Check the settings can be programmed into the USART
    pub fn validate(&self) -> Result<(), SerialConfigError> {
        if self.baudrate == 0 || self.baudrate > MAX_BAUDRATE {
            return Err(SerialConfigError::BadSpeed);
        }
        Ok(())
    }

    /// Bits per character on the wire, excluding start and stop bits
    pub fn word_length(&self) -> u8 {
        match self.parity {
            Parity::None => 8,
            Parity::Odd | Parity::Even => 9,
        }
    }
}
