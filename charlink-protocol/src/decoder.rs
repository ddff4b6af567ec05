//! Frame decoder and dispatcher.
//!
//! Each call to [`FrameDecoder::decode`] walks the staged bytes:
//!
//! 1. fewer than 4 bytes: wait for more
//! 2. unknown command id: drop one byte, retry
//! 3. declared size outside the command's range: drop one byte, retry
//! 4. frame not fully staged yet: wait for more, keep everything
//! 5. checksum mismatch: drop one byte, retry
//! 6. valid frame: run the handler, then clear the staging window
//!
//! Dropping a single byte at a time lets the stream realign after noise or a
//! host restarting mid-frame. At most one command is dispatched per call, and
//! anything staged behind it is discarded with it.

use crate::command::{CommandHandler, CommandId, CommandTable, SizeCheck};
use crate::encoder::Responder;
use crate::frame::{Frame, FrameBuf, COMMAND_ID_OFFSET, MIN_FRAME_SIZE, PAYLOAD_SIZE_OFFSET};
use crate::stats::{bump, ProtocolStats};
use crate::transport::{Inbound, Outbound};

/// Default staging window per transport
pub const STAGING_SIZE: usize = 1024;

/// Bytes received but not yet consumed by the decoder
///
/// Resync advances a read cursor instead of moving memory; the window is
/// only compacted when the write side reaches the end of the buffer.
pub struct Staging<const N: usize = STAGING_SIZE> {
    buf: [u8; N],
    start: usize,
    end: usize,
}

impl<const N: usize> Default for Staging<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Staging<N> {
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            start: 0,
            end: 0,
        }
    }

    /// Bytes waiting to be decoded
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The undecoded bytes, oldest first
    pub fn window(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    /// Pull as many bytes as fit from `inbound`, returns how many arrived
    pub fn fill_from(&mut self, inbound: &dyn Inbound) -> usize {
        self.make_room();
        let n = inbound.read(&mut self.buf[self.end..]);
        self.end += n;
        n
    }

    /// Append bytes directly, returns how many fit
    pub fn extend(&mut self, bytes: &[u8]) -> usize {
        self.make_room();
        let n = bytes.len().min(N - self.end);
        self.buf[self.end..self.end + n].copy_from_slice(&bytes[..n]);
        self.end += n;
        n
    }

    /// Drop `count` bytes from the front of the window
    pub fn discard_front(&mut self, count: usize) {
        self.start = (self.start + count).min(self.end);
        if self.start == self.end {
            self.clear();
        }
    }

    /// Forget everything staged
    pub fn clear(&mut self) {
        self.start = 0;
        self.end = 0;
    }

    /// Move the window to the start of the buffer
    pub fn compact(&mut self) {
        if self.start == 0 {
            return;
        }
        self.buf.copy_within(self.start..self.end, 0);
        self.end -= self.start;
        self.start = 0;
    }

    fn make_room(&mut self) {
        if self.end == N && self.start > 0 {
            self.compact();
        }
    }
}

/// Result of one decode pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeOutcome {
    /// Nothing dispatched, more bytes are needed
    NoCommand,
    /// A handler ran and sent its response
    Processed(CommandId),
}

impl DecodeOutcome {
    pub fn is_processed(&self) -> bool {
        matches!(self, Self::Processed(_))
    }
}

/// Protocol state: command registry, counters and the request/reply buffer
pub struct FrameDecoder<'a> {
    table: CommandTable<'a>,
    stats: ProtocolStats,
    frame: FrameBuf,
}

impl<'a> FrameDecoder<'a> {
    pub fn new(table: CommandTable<'a>) -> Self {
        Self {
            table,
            stats: ProtocolStats::new(),
            frame: FrameBuf::new(),
        }
    }

    pub fn stats(&self) -> &ProtocolStats {
        &self.stats
    }

    pub fn table(&self) -> CommandTable<'a> {
        self.table
    }

    /// Run one decode pass over `staging`
    ///
    /// A dispatched handler answers through `out`, the outbound side of the
    /// transport the request arrived on.
    pub fn decode<const N: usize, H: CommandHandler + ?Sized>(
        &mut self,
        staging: &mut Staging<N>,
        handler: &mut H,
        out: &dyn Outbound,
    ) -> DecodeOutcome {
        bump(&mut self.stats.decode_passes);

        loop {
            let window = staging.window();
            if window.len() < MIN_FRAME_SIZE {
                return DecodeOutcome::NoCommand;
            }

            let id = window[COMMAND_ID_OFFSET];
            let Some(descriptor) = self.table.find(id) else {
                trace!("unknown command {=u8:#x}, resync", id);
                bump(&mut self.stats.bad_id);
                staging.discard_front(1);
                continue;
            };

            let size = window[PAYLOAD_SIZE_OFFSET];
            match descriptor.check_size(size) {
                SizeCheck::Accepted => {}
                SizeCheck::BelowMinimum => {
                    trace!("command {=u8:#x} size {=u8} too short, resync", id, size);
                    bump(&mut self.stats.bad_size_below_min);
                    staging.discard_front(1);
                    continue;
                }
                SizeCheck::AboveMaximum => {
                    trace!("command {=u8:#x} size {=u8} too long, resync", id, size);
                    bump(&mut self.stats.bad_size_above_max);
                    staging.discard_front(1);
                    continue;
                }
            }

            let Some(frame) = Frame::new(window) else {
                bump(&mut self.stats.incomplete);
                return DecodeOutcome::NoCommand;
            };

            if !frame.is_valid() {
                trace!("command {=u8:#x} bad checksum, resync", id);
                bump(&mut self.stats.bad_checksum);
                staging.discard_front(1);
                continue;
            }

            let command = descriptor.command;
            self.frame.load(frame.body());
            debug!("dispatch {}", command);

            bump(&mut self.stats.dispatched);
            let _sent = handler.handle(command, &mut self.frame, Responder::new(out));
            bump(&mut self.stats.dispatched_completed);

            staging.clear();
            return DecodeOutcome::Processed(command);
        }
    }
}
