//! Interrupt-safe circular byte queue.
//!
//! One producer and one consumer share each ring, typically an interrupt
//! handler on one side and the main loop on the other. Every `put` and `get`
//! runs as a single critical section so neither side can observe a torn
//! head/tail pair.
//!
//! The store keeps one slot spare to tell empty from full:
//! - `head`: next byte to read
//! - `tail`: next byte to write
//! - used bytes = `(tail - head) mod STORE`, never more than `STORE - 1`
//!
//! Writing more than fits is not an error. The oldest unread bytes are
//! dropped so the newest data always survives, in FIFO order. Writers that
//! must not be split, like outgoing frames, use [`RingBuffer::put_all`]
//! instead, which stores everything or nothing.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Usable bytes per ring
pub const RING_SIZE: usize = 128;

/// Backing store size (one slot reserved)
pub const RING_STORE_SIZE: usize = RING_SIZE + 1;

/// Overrun bookkeeping for one ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Overruns {
    /// Number of `put` calls that had to drop unread data
    pub events: u32,
    /// Total unread bytes dropped
    pub bytes: u32,
}

struct RingStore<const S: usize> {
    buffer: [u8; S],
    head: usize,
    tail: usize,
    overruns: Overruns,
}

impl<const S: usize> RingStore<S> {
    const CAPACITY: usize = S - 1;

    const fn new() -> Self {
        Self {
            buffer: [0; S],
            head: 0,
            tail: 0,
            overruns: Overruns { events: 0, bytes: 0 },
        }
    }

    fn used(&self) -> usize {
        if self.tail >= self.head {
            self.tail - self.head
        } else {
            S - self.head + self.tail
        }
    }

    fn record_overrun(&mut self, bytes: usize) {
        self.overruns.events = self.overruns.events.saturating_add(1);
        self.overruns.bytes = self.overruns.bytes.saturating_add(bytes as u32);
    }

    /// Returns how many bytes were lost, stored or incoming
    fn put(&mut self, bytes: &[u8]) -> usize {
        let size = bytes.len();
        if size == 0 {
            return 0;
        }

        let used = self.used();
        let unused = Self::CAPACITY - used;
        let dropped = (used + size).saturating_sub(Self::CAPACITY);

        if size >= Self::CAPACITY {
            // Only the last CAPACITY bytes can survive
            let offset = size - Self::CAPACITY;
            self.buffer[..Self::CAPACITY].copy_from_slice(&bytes[offset..]);
            self.head = 0;
            self.tail = Self::CAPACITY;
        } else {
            let end = S - self.tail;
            if size < end {
                self.buffer[self.tail..self.tail + size].copy_from_slice(bytes);
                self.tail += size;
            } else {
                self.buffer[self.tail..].copy_from_slice(&bytes[..end]);
                self.buffer[..size - end].copy_from_slice(&bytes[end..]);
                self.tail = size - end;
            }

            if unused < size {
                self.head = self.tail + 1;
                if self.head >= S {
                    self.head = 0;
                }
            }
        }

        if dropped > 0 {
            self.record_overrun(dropped);
        }
        dropped
    }

    fn put_all(&mut self, bytes: &[u8]) -> bool {
        if bytes.len() > Self::CAPACITY - self.used() {
            self.record_overrun(bytes.len());
            return false;
        }
        self.put(bytes);
        true
    }

    fn get(&mut self, out: &mut [u8]) -> usize {
        let size = out.len().min(self.used());

        // At most two copies: head to end of store, then from the start
        let first = size.min(S - self.head);
        out[..first].copy_from_slice(&self.buffer[self.head..self.head + first]);
        let second = size - first;
        out[first..size].copy_from_slice(&self.buffer[..second]);

        self.head = (self.head + size) % S;
        size
    }
}

/// Fixed-capacity byte ring shared between interrupt and main-loop context
///
/// `S` is the backing store size; the ring holds `S - 1` bytes.
pub struct RingBuffer<const S: usize = RING_STORE_SIZE> {
    store: Mutex<CriticalSectionRawMutex, RefCell<RingStore<S>>>,
}

impl<const S: usize> Default for RingBuffer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const S: usize> RingBuffer<S> {
    /// Create an empty ring, usable in a `static`
    pub const fn new() -> Self {
        Self {
            store: Mutex::new(RefCell::new(RingStore::new())),
        }
    }

    /// Usable capacity in bytes
    pub const fn capacity(&self) -> usize {
        S - 1
    }

    /// Empty the ring (head = tail = 0)
    pub fn reset(&self) {
        self.store.lock(|store| {
            let mut store = store.borrow_mut();
            store.head = 0;
            store.tail = 0;
        });
    }

    /// Append bytes, dropping the oldest unread data if they do not fit
    ///
    /// Returns how many bytes were lost, 0 when the write fit. That is
    /// `len + bytes.len() - capacity`: once `bytes` alone is at least the
    /// capacity, the count includes the leading part of `bytes` itself,
    /// which was never stored.
    pub fn put(&self, bytes: &[u8]) -> usize {
        let dropped = self.store.lock(|store| store.borrow_mut().put(bytes));
        if dropped > 0 {
            warn!("ring overrun: dropped {} bytes", dropped);
        }
        dropped
    }

    /// Append `bytes` only if all of them fit in the free space
    ///
    /// Otherwise nothing is stored, the unread data is left alone and the
    /// whole write counts as one overrun. Returns whether it was stored.
    pub fn put_all(&self, bytes: &[u8]) -> bool {
        let stored = self.store.lock(|store| store.borrow_mut().put_all(bytes));
        if !stored {
            warn!("ring full: rejected {} bytes", bytes.len());
        }
        stored
    }

    /// Copy out up to `out.len()` bytes, oldest first
    ///
    /// Returns the number of bytes copied.
    pub fn get(&self, out: &mut [u8]) -> usize {
        self.store.lock(|store| store.borrow_mut().get(out))
    }

    /// Bytes waiting to be read
    pub fn len(&self) -> usize {
        self.store.lock(|store| store.borrow().used())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overrun counters since boot
    pub fn overruns(&self) -> Overruns {
        self.store.lock(|store| store.borrow().overruns)
    }
}
