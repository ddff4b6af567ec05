//! TOML configuration loading
//!
//! ```toml
//! [serial]
//! baudrate = 19200
//! parity = "even"
//!
//! [usb]
//! serial_number = "A-0042"
//!
//! [display]
//! contrast = 90
//!
//! [keypad]
//! press_mask = 0x3F
//! ```

use super::types::{ConfigError, DeviceConfig};

/// Parse and validate a configuration document
pub fn parse_config(input: &str) -> Result<DeviceConfig, ConfigError> {
    let config: DeviceConfig = toml::from_str(input).map_err(|_| {
        warn!("config: TOML rejected");
        ConfigError::Toml
    })?;

    config.validate().map_err(|e| {
        warn!("config: invalid settings {}", e);
        e
    })?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use charlink_hal::Parity;

    #[test]
    fn test_empty_document_is_factory_config() {
        assert_eq!(parse_config("").unwrap(), DeviceConfig::default());
    }

    #[test]
    fn test_partial_overrides() {
        let config = parse_config(
            r#"
            [serial]
            baudrate = 19200
            parity = "even"

            [usb]
            serial_number = "A-0042"

            [display]
            contrast = 90

            [keypad]
            press_mask = 0x3F
            "#,
        )
        .unwrap();

        assert_eq!(config.serial.baudrate, 19_200);
        assert_eq!(config.serial.parity, Parity::Even);
        assert_eq!(config.usb.vendor.as_str(), "Crystalfontz");
        assert_eq!(config.usb.serial_number.as_str(), "A-0042");
        assert_eq!(config.display.contrast, 90);
        assert_eq!(config.display.backlight, 100);
        assert_eq!(config.keypad.press_mask, 0x3F);
        assert_eq!(config.keypad.release_mask, 0);
    }

    #[test]
    fn test_rejects_out_of_range_baudrate() {
        let result = parse_config("[serial]\nbaudrate = 5000000\n");
        assert!(matches!(result, Err(ConfigError::Serial(_))));
    }

    #[test]
    fn test_rejects_long_descriptor_string() {
        let result = parse_config("[usb]\nproduct = \"a product name that is too long\"\n");
        assert_eq!(result, Err(ConfigError::Toml));
    }

    #[test]
    fn test_rejects_unknown_parity() {
        let result = parse_config("[serial]\nparity = \"mark\"\n");
        assert_eq!(result, Err(ConfigError::Toml));
    }

    #[test]
    fn test_rejects_syntax_error() {
        assert_eq!(parse_config("[serial"), Err(ConfigError::Toml));
    }
}
