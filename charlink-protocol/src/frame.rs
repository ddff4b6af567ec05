//! Frame layout for the host link.
//!
//! Frame format (identical on serial and USB):
//! - COMMAND (1 byte): command id, 0x40 set on device responses
//! - SIZE (1 byte): payload length
//! - PAYLOAD (SIZE bytes): command-specific data
//! - CHECKSUM (2 bytes): CRC16 of COMMAND, SIZE and PAYLOAD, little-endian

use crate::crc;

pub const COMMAND_ID_OFFSET: usize = 0;
pub const PAYLOAD_SIZE_OFFSET: usize = 1;
pub const PAYLOAD_OFFSET: usize = 2;

/// Command id + payload size
pub const HEADER_SIZE: usize = PAYLOAD_OFFSET;

/// Trailing CRC16
pub const CHECKSUM_SIZE: usize = 2;

/// Smallest possible frame (empty payload)
pub const MIN_FRAME_SIZE: usize = HEADER_SIZE + CHECKSUM_SIZE;

/// Largest payload the size byte can describe
pub const MAX_PAYLOAD_SIZE: usize = u8::MAX as usize;

/// Largest complete frame
pub const MAX_FRAME_SIZE: usize = HEADER_SIZE + MAX_PAYLOAD_SIZE + CHECKSUM_SIZE;

/// Set in the command byte of normal device-to-host replies
pub const RESPONSE_FLAG: u8 = 0x40;

/// Total on-wire length of a frame with `payload_size` payload bytes
pub const fn frame_size(payload_size: u8) -> usize {
    HEADER_SIZE + payload_size as usize + CHECKSUM_SIZE
}

/// Errors from building frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// A complete frame (header, payload, checksum) borrowed from a receive buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    bytes: &'a [u8],
}

impl<'a> Frame<'a> {
    /// View the first frame in `bytes`
    ///
    /// Returns `None` if `bytes` does not yet hold the whole frame its header
    /// announces.
    pub fn new(bytes: &'a [u8]) -> Option<Self> {
        if bytes.len() < MIN_FRAME_SIZE {
            return None;
        }
        let total = frame_size(bytes[PAYLOAD_SIZE_OFFSET]);
        if bytes.len() < total {
            return None;
        }
        Some(Self {
            bytes: &bytes[..total],
        })
    }

    pub fn command_id(&self) -> u8 {
        self.bytes[COMMAND_ID_OFFSET]
    }

    pub fn payload_size(&self) -> u8 {
        self.bytes[PAYLOAD_SIZE_OFFSET]
    }

    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[PAYLOAD_OFFSET..self.body_len()]
    }

    /// Header and payload, the part the checksum covers
    pub fn body(&self) -> &'a [u8] {
        &self.bytes[..self.body_len()]
    }

    /// The transmitted checksum
    pub fn checksum(&self) -> u16 {
        let at = self.body_len();
        u16::from_le_bytes([self.bytes[at], self.bytes[at + 1]])
    }

    /// True if the transmitted checksum matches the body
    pub fn is_valid(&self) -> bool {
        crc::verify(self.bytes)
    }

    /// Total length on the wire
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    fn body_len(&self) -> usize {
        self.bytes.len() - CHECKSUM_SIZE
    }
}

/// Owned frame body with room for the checksum
///
/// Handlers receive the request in one of these and rewrite it in place into
/// their reply, the way the request buffer doubles as the response buffer.
#[derive(Clone)]
pub struct FrameBuf {
    bytes: [u8; MAX_FRAME_SIZE],
    len: usize,
}

impl Default for FrameBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for FrameBuf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameBuf")
            .field("body", &self.as_bytes())
            .finish()
    }
}

impl FrameBuf {
    /// An empty body (command 0, no payload)
    pub const fn new() -> Self {
        Self {
            bytes: [0; MAX_FRAME_SIZE],
            len: HEADER_SIZE,
        }
    }

    /// Start a body for `command_id` with `payload`
    pub fn with_payload(command_id: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let mut buf = Self::new();
        buf.bytes[COMMAND_ID_OFFSET] = command_id;
        buf.set_payload(payload)?;
        Ok(buf)
    }

    /// Copy a validated frame body (header + payload) in
    pub(crate) fn load(&mut self, body: &[u8]) {
        let len = body.len().min(MAX_FRAME_SIZE - CHECKSUM_SIZE);
        self.bytes[..len].copy_from_slice(&body[..len]);
        self.len = len;
    }

    pub fn command_id(&self) -> u8 {
        self.bytes[COMMAND_ID_OFFSET]
    }

    pub fn set_command_id(&mut self, command_id: u8) {
        self.bytes[COMMAND_ID_OFFSET] = command_id;
    }

    /// Payload length of the current body
    pub fn payload_len(&self) -> usize {
        self.len - HEADER_SIZE
    }

    pub fn payload(&self) -> &[u8] {
        &self.bytes[PAYLOAD_OFFSET..self.len]
    }

    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[PAYLOAD_OFFSET..self.len]
    }

    /// Replace the payload
    pub fn set_payload(&mut self, payload: &[u8]) -> Result<(), FrameError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadTooLarge);
        }
        self.bytes[PAYLOAD_OFFSET..PAYLOAD_OFFSET + payload.len()].copy_from_slice(payload);
        self.len = HEADER_SIZE + payload.len();
        self.bytes[PAYLOAD_SIZE_OFFSET] = payload.len() as u8;
        Ok(())
    }

    /// Set the payload length and return the payload for filling in
    ///
    /// Bytes already in the buffer are kept, so a reply can reuse request
    /// data in place.
    pub fn resize_payload(&mut self, len: u8) -> &mut [u8] {
        self.len = HEADER_SIZE + len as usize;
        self.bytes[PAYLOAD_SIZE_OFFSET] = len;
        self.payload_mut()
    }

    /// Drop the payload, leaving a header-only body
    pub fn clear_payload(&mut self) {
        self.len = HEADER_SIZE;
        self.bytes[PAYLOAD_SIZE_OFFSET] = 0;
    }

    /// Header and payload
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Body length (header + payload, no checksum)
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whole backing store and the current body length, for sealing
    pub(crate) fn raw_mut(&mut self) -> (&mut [u8; MAX_FRAME_SIZE], usize) {
        (&mut self.bytes, self.len)
    }
}

/// Encode a complete frame into `buffer`
///
/// Returns the number of bytes written. This is how a host (or a test)
/// builds requests; the device side seals replies through
/// [`crate::encoder`].
pub fn encode(command_id: u8, payload: &[u8], buffer: &mut [u8]) -> Result<usize, FrameError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(FrameError::PayloadTooLarge);
    }
    let body_len = HEADER_SIZE + payload.len();
    if buffer.len() < body_len + CHECKSUM_SIZE {
        return Err(FrameError::BufferTooSmall);
    }

    buffer[COMMAND_ID_OFFSET] = command_id;
    buffer[PAYLOAD_SIZE_OFFSET] = payload.len() as u8;
    buffer[PAYLOAD_OFFSET..body_len].copy_from_slice(payload);
    Ok(crc::append(buffer, body_len))
}
