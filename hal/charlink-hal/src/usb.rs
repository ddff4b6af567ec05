//! USB device identity
//!
//! The vendor, product and serial number strings can be changed before the
//! USB stack is started. They are handed to the stack as standard string
//! descriptors.

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::Deserialize;

/// Maximum characters kept from each identity string
pub const MAX_STRING_CHARS: usize = 20;

/// Size of an encoded string descriptor (2 header bytes + UTF-16 text)
pub const MAX_DESCRIPTOR_SIZE: usize = 2 + MAX_STRING_CHARS * 2;

/// `bDescriptorType` for string descriptors
pub const STRING_DESCRIPTOR_TYPE: u8 = 0x03;

/// Which identity string a descriptor carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StringIndex {
    Vendor = 1,
    Product = 2,
    SerialNumber = 3,
}

/// Strings reported to the host during enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct UsbIdentity {
    pub vendor: String<MAX_STRING_CHARS>,
    pub product: String<MAX_STRING_CHARS>,
    pub serial_number: String<MAX_STRING_CHARS>,
}

impl Default for UsbIdentity {
    fn default() -> Self {
        Self {
            vendor: fixed("Crystalfontz"),
            product: fixed("User CFA-735"),
            serial_number: fixed("1001"),
        }
    }
}

fn fixed(s: &str) -> String<MAX_STRING_CHARS> {
    let mut out = String::new();
    for ch in s.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

impl UsbIdentity {
    /// Build an identity, truncating each string to [`MAX_STRING_CHARS`]
    pub fn new(vendor: &str, product: &str, serial_number: &str) -> Self {
        Self {
            vendor: fixed(vendor),
            product: fixed(product),
            serial_number: fixed(serial_number),
        }
    }

    /// Text for a given descriptor index
    pub fn string(&self, index: StringIndex) -> &str {
        match index {
            StringIndex::Vendor => &self.vendor,
            StringIndex::Product => &self.product,
            StringIndex::SerialNumber => &self.serial_number,
        }
    }

    /// Encode one identity string as a USB string descriptor
    pub fn descriptor(&self, index: StringIndex) -> Vec<u8, MAX_DESCRIPTOR_SIZE> {
        string_descriptor(self.string(index))
    }
}

/// Encode text as a USB string descriptor (`bLength`, type, UTF-16LE)
///
/// Text beyond [`MAX_STRING_CHARS`] UTF-16 units is dropped.
pub fn string_descriptor(text: &str) -> Vec<u8, MAX_DESCRIPTOR_SIZE> {
    let mut out = Vec::new();
    // Length is patched once the text is encoded
    let _ = out.push(0);
    let _ = out.push(STRING_DESCRIPTOR_TYPE);
    for unit in text.encode_utf16().take(MAX_STRING_CHARS) {
        let [lo, hi] = unit.to_le_bytes();
        let _ = out.push(lo);
        let _ = out.push(hi);
    }
    out[0] = out.len() as u8;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_identity() {
        let id = UsbIdentity::default();
        assert_eq!(id.string(StringIndex::Vendor), "Crystalfontz");
        assert_eq!(id.string(StringIndex::Product), "User CFA-735");
        assert_eq!(id.string(StringIndex::SerialNumber), "1001");
    }

    #[test]
    fn test_descriptor_layout() {
        let desc = string_descriptor("AB");
        assert_eq!(&desc[..], &[6, 0x03, b'A', 0, b'B', 0]);
    }

    #[test]
    fn test_empty_descriptor() {
        let desc = string_descriptor("");
        assert_eq!(&desc[..], &[2, 0x03]);
    }

    #[test]
    fn test_long_text_truncated() {
        let desc = string_descriptor("ABCDEFGHIJKLMNOPQRSTUVWXYZ");
        assert_eq!(desc.len(), MAX_DESCRIPTOR_SIZE);
        assert_eq!(desc[0] as usize, MAX_DESCRIPTOR_SIZE);
        assert_eq!(desc[desc.len() - 2], b'T');
    }

    #[test]
    fn test_new_truncates_strings() {
        let id = UsbIdentity::new("0123456789012345678901234", "p", "s");
        assert_eq!(id.vendor.len(), MAX_STRING_CHARS);
        assert_eq!(id.descriptor(StringIndex::Product)[0], 4);
    }
}
