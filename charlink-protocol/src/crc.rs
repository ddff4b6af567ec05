//! Frame checksum.
//!
//! 16-bit CRC with the reflected CCITT polynomial (0x8408), the variant used
//! by IrDA and HDLC links: seed 0xFFFF, table-driven, one byte per step,
//! result complemented. It is transmitted little-endian.

const POLYNOMIAL: u16 = 0x8408;

static TABLE: [u16; 256] = build_table();

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u16;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ POLYNOMIAL
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Compute the checksum of `data`
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc = (crc >> 8) ^ TABLE[((crc ^ byte as u16) & 0xFF) as usize];
    }
    !crc
}

/// Write the checksum of `buf[..len]` into `buf[len..len + 2]`
///
/// Returns the sealed length (`len + 2`).
///
/// # Panics
///
/// If `buf` has fewer than `len + 2` bytes.
pub fn append(buf: &mut [u8], len: usize) -> usize {
    let crc = crc16(&buf[..len]);
    buf[len..len + 2].copy_from_slice(&crc.to_le_bytes());
    len + 2
}

/// Check that the last two bytes of `sealed` are the checksum of the rest
pub fn verify(sealed: &[u8]) -> bool {
    if sealed.len() < 2 {
        return false;
    }
    let (body, trailer) = sealed.split_at(sealed.len() - 2);
    crc16(body) == u16::from_le_bytes([trailer[0], trailer[1]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_irda_reference() {
        assert_eq!(TABLE[0], 0x0000);
        assert_eq!(TABLE[1], 0x1189);
        assert_eq!(TABLE[0x80], 0x8408);
        assert_eq!(TABLE[0xFF], 0x0F78);
    }

    #[test]
    fn test_check_value() {
        // CRC-16/X-25 catalogue check value
        assert_eq!(crc16(b"123456789"), 0x906E);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(crc16(&[]), 0x0000);
    }

    #[test]
    fn test_append_then_verify() {
        let mut buf = [0x1F, 0x03, 0x00, 0x01, b'A', 0, 0];
        let len = append(&mut buf, 5);
        assert_eq!(len, 7);
        assert!(verify(&buf));
    }

    #[test]
    fn test_append_little_endian() {
        let mut buf = [0u8; 4];
        append(&mut buf, 2);
        let crc = crc16(&[0, 0]);
        assert_eq!(buf[2], (crc & 0xFF) as u8);
        assert_eq!(buf[3], (crc >> 8) as u8);
    }

    #[test]
    fn test_verify_rejects_corruption() {
        let mut buf = [0x06, 0x00, 0, 0];
        append(&mut buf, 2);
        buf[3] ^= 0x01;
        assert!(!verify(&buf));
    }

    #[test]
    fn test_verify_too_short() {
        assert!(!verify(&[0x12]));
    }
}
