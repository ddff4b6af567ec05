//! Response encoder.
//!
//! Fills in the size byte, seals the body with its checksum and pushes the
//! finished frame to the outbound side of the transport it belongs to.

use crate::crc;
use crate::frame::{FrameBuf, HEADER_SIZE, PAYLOAD_SIZE_OFFSET, RESPONSE_FLAG};
use crate::transport::Outbound;

/// Seal `buf[..size]` as a frame: size byte from `size`, checksum appended
///
/// Returns the sealed length (`size + 2`).
///
/// # Panics
///
/// If `size` is shorter than a header or `buf` has no room for the checksum.
pub fn seal_normal(buf: &mut [u8], size: usize) -> usize {
    buf[PAYLOAD_SIZE_OFFSET] = (size - HEADER_SIZE) as u8;
    crc::append(buf, size)
}

/// Like [`seal_normal`], also marking the frame as a device reply
pub fn seal_device(buf: &mut [u8], size: usize) -> usize {
    buf[0] |= RESPONSE_FLAG;
    seal_normal(buf, size)
}

/// Seal and send an unsolicited report (no response flag)
pub fn send_normal_response(out: &dyn Outbound, buf: &mut [u8], size: usize) {
    let len = seal_normal(buf, size);
    out.write(&buf[..len]);
}

/// Seal and send a reply to a host command
pub fn send_device_response(out: &dyn Outbound, buf: &mut [u8], size: usize) {
    let len = seal_device(buf, size);
    out.write(&buf[..len]);
}

/// Proof that a handler sent its one response
#[must_use = "a handler must return the token from its response"]
#[derive(Debug)]
pub struct Sent {
    _private: (),
}

/// One-shot reply path handed to a command handler
///
/// Consumed by sending, so a handler cannot answer twice, and the
/// [`Sent`] token it returns can only come from here.
pub struct Responder<'t> {
    out: &'t dyn Outbound,
}

impl<'t> Responder<'t> {
    pub fn new(out: &'t dyn Outbound) -> Self {
        Self { out }
    }

    /// Send `frame` as a device reply (response flag set)
    pub fn device_response(self, frame: &mut FrameBuf) -> Sent {
        let (bytes, len) = frame.raw_mut();
        send_device_response(self.out, bytes, len);
        Sent { _private: () }
    }

    /// Send `frame` without the response flag
    pub fn normal_response(self, frame: &mut FrameBuf) -> Sent {
        let (bytes, len) = frame.raw_mut();
        send_normal_response(self.out, bytes, len);
        Sent { _private: () }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use heapless::Vec;

    #[derive(Default)]
    struct Capture(RefCell<Vec<u8, 300>>);

    impl Outbound for Capture {
        fn write(&self, bytes: &[u8]) {
            self.0.borrow_mut().extend_from_slice(bytes).unwrap();
        }
    }

    #[test]
    fn test_device_response_sets_flag_and_checksum() {
        let out = Capture::default();
        let mut buf = [0x00, 0xAA, 0, 0];
        send_device_response(&out, &mut buf, 2);

        let sent = out.0.borrow();
        let crc = crc::crc16(&[0x40, 0x00]).to_le_bytes();
        assert_eq!(&sent[..], &[0x40, 0x00, crc[0], crc[1]]);
    }

    #[test]
    fn test_normal_response_leaves_id_alone() {
        let out = Capture::default();
        let mut buf = [0x80, 0, 3, 0, 0];
        send_normal_response(&out, &mut buf, 3);

        let sent = out.0.borrow();
        assert_eq!(&sent[..3], &[0x80, 1, 3]);
        assert!(crc::verify(&sent));
    }

    #[test]
    fn test_size_byte_rewritten_from_length() {
        let mut buf = [0x18, 0, 1, 2, 3, 0, 0];
        assert_eq!(seal_device(&mut buf, 5), 7);
        assert_eq!(buf[0], 0x58);
        assert_eq!(buf[1], 3);
    }

    #[test]
    fn test_responder_sends_frame_buf() {
        let out = Capture::default();
        let mut frame = FrameBuf::with_payload(0x00, b"hi").unwrap();
        let _sent = Responder::new(&out).device_response(&mut frame);

        let sent = out.0.borrow();
        assert_eq!(sent.len(), 6);
        assert_eq!(&sent[..4], &[0x40, 2, b'h', b'i']);
        assert!(crc::verify(&sent));
    }
}
