//! Configuration type definitions

use charlink_hal::{Keys, SerialConfig, SerialConfigError, UsbIdentity};

#[cfg(feature = "config")]
use serde::Deserialize;

/// Factory contrast level
pub const DEFAULT_CONTRAST: u8 = 127;

/// Factory backlight level (percent)
pub const DEFAULT_BACKLIGHT: u8 = 100;

/// Errors from loading or validating configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// TOML syntax error, wrong value type or string too long
    Toml,
    /// Serial settings out of range
    Serial(SerialConfigError),
    /// Key mask names bits that are not keys
    BadKeyMask,
}

impl From<SerialConfigError> for ConfigError {
    fn from(e: SerialConfigError) -> Self {
        ConfigError::Serial(e)
    }
}

/// Panel settings applied at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "config", derive(Deserialize), serde(default))]
pub struct DisplaySettings {
    pub contrast: u8,
    pub backlight: u8,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            contrast: DEFAULT_CONTRAST,
            backlight: DEFAULT_BACKLIGHT,
        }
    }
}

/// Key report masks applied at startup, in protocol key bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "config", derive(Deserialize), serde(default))]
pub struct KeypadSettings {
    pub press_mask: u8,
    pub release_mask: u8,
}

impl KeypadSettings {
    pub fn press_keys(&self) -> Keys {
        Keys::from_bits(self.press_mask)
    }

    pub fn release_keys(&self) -> Keys {
        Keys::from_bits(self.release_mask)
    }
}

/// Complete device configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "config", derive(Deserialize), serde(default))]
pub struct DeviceConfig {
    pub serial: SerialConfig,
    pub usb: UsbIdentity,
    pub display: DisplaySettings,
    pub keypad: KeypadSettings,
}

impl DeviceConfig {
    /// Check every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.serial.validate()?;
        let all = Keys::ALL.bits();
        if self.keypad.press_mask & !all != 0 || self.keypad.release_mask & !all != 0 {
            return Err(ConfigError::BadKeyMask);
        }
        Ok(())
    }
}
