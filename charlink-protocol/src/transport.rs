//! Transport boundary.
//!
//! A [`Port`] owns the inbound and outbound rings of one physical channel
//! plus the latch that keeps at most one hardware transmission in flight.
//! Interrupt handlers call the `receive` / `service_tx` side; the main loop
//! uses `read` / `queue` through a [`PortTransport`].
//!
//! ```text
//!  RX ISR ──receive──▶ [rx ring] ──read──▶ main loop
//!  main loop ──queue──▶ [tx ring] ──service_tx──▶ TX ISR / endpoint
//! ```

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::ring::{Overruns, RingBuffer, RING_STORE_SIZE};

/// Bytes moved per transmit-empty interrupt on the serial port
pub const SERIAL_CHUNK: usize = 1;

/// Bytes moved per IN transaction on the USB bulk endpoint
pub const USB_PACKET_SIZE: usize = 64;

/// Largest chunk any transmitter may ask for
pub const MAX_CHUNK: usize = USB_PACKET_SIZE;

/// Source of received bytes
pub trait Inbound {
    /// Copy out up to `buf.len()` received bytes, returns how many
    fn read(&self, buf: &mut [u8]) -> usize;
}

/// Sink for bytes to transmit
pub trait Outbound {
    /// Queue bytes for transmission; never blocks
    fn write(&self, bytes: &[u8]);
}

/// A full-duplex command channel
pub trait Transport: Inbound + Outbound {}

impl<T: Inbound + Outbound + ?Sized> Transport for T {}

/// Transmit side of the hardware, driven from interrupt context
pub trait TxHardware {
    /// Bytes this transmitter takes per transaction
    const CHUNK: usize;

    /// Start sending `chunk`
    fn transmit(&mut self, chunk: &[u8]);

    /// Nothing left to send
    fn idle(&mut self);
}

/// Hook that gets the transmitter going after the latch was idle
pub trait TxPump {
    /// Called from the main loop when data was queued and no
    /// transmission is in flight
    fn arm(&self);
}

/// Rings and flow-control latch for one channel
pub struct Port<const S: usize = RING_STORE_SIZE> {
    rx: RingBuffer<S>,
    tx: RingBuffer<S>,
    in_flight: Mutex<CriticalSectionRawMutex, Cell<bool>>,
}

impl<const S: usize> Default for Port<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const S: usize> Port<S> {
    /// Create an idle port, usable in a `static`
    pub const fn new() -> Self {
        Self {
            rx: RingBuffer::new(),
            tx: RingBuffer::new(),
            in_flight: Mutex::new(Cell::new(false)),
        }
    }

    /// Empty both rings and clear the latch
    pub fn reset(&self) {
        critical_section::with(|_| {
            self.rx.reset();
            self.tx.reset();
            self.in_flight.lock(|latch| latch.set(false));
        });
    }

    /// Main loop: pull received bytes
    pub fn read(&self, buf: &mut [u8]) -> usize {
        self.rx.get(buf)
    }

    /// Main loop: queue bytes for transmission
    ///
    /// Each call is one frame and is queued whole or not at all, so a reply
    /// that does not fit the free space is dropped and counted in
    /// [`tx_overruns`](Self::tx_overruns) rather than sent truncated.
    ///
    /// Returns `true` when the bytes were queued and no transmission was in
    /// flight, in which case the caller must arm the transmitter. The latch
    /// is taken in the same critical section as the ring write, so a
    /// completing transmission cannot clear it between the two.
    pub fn queue(&self, bytes: &[u8]) -> bool {
        critical_section::with(|_| {
            if !self.tx.put_all(bytes) {
                return false;
            }
            self.in_flight.lock(|latch| !latch.replace(true))
        })
    }

    /// Interrupt: store bytes delivered by the hardware
    pub fn receive(&self, bytes: &[u8]) {
        self.rx.put(bytes);
    }

    /// Interrupt: take the next chunk to transmit
    ///
    /// Returns 0 and releases the latch when the ring is empty.
    pub fn next_chunk(&self, buf: &mut [u8]) -> usize {
        critical_section::with(|_| {
            let n = self.tx.get(buf);
            if n == 0 {
                self.in_flight.lock(|latch| latch.set(false));
            }
            n
        })
    }

    /// Interrupt: move one chunk to the hardware, or tell it to go idle
    ///
    /// Call on transmit-complete (and once from the pump when arming).
    pub fn service_tx<H: TxHardware>(&self, hw: &mut H) -> usize {
        let mut chunk = [0u8; MAX_CHUNK];
        let size = H::CHUNK.clamp(1, MAX_CHUNK);
        let n = self.next_chunk(&mut chunk[..size]);
        if n == 0 {
            hw.idle();
        } else {
            hw.transmit(&chunk[..n]);
        }
        n
    }

    /// True while a transmission is outstanding
    pub fn is_transmitting(&self) -> bool {
        self.in_flight.lock(|latch| latch.get())
    }

    pub fn rx(&self) -> &RingBuffer<S> {
        &self.rx
    }

    pub fn tx(&self) -> &RingBuffer<S> {
        &self.tx
    }

    /// Inbound data lost because the main loop fell behind
    pub fn rx_overruns(&self) -> Overruns {
        self.rx.overruns()
    }

    /// Outbound data lost because the wire fell behind
    pub fn tx_overruns(&self) -> Overruns {
        self.tx.overruns()
    }
}

/// Main-loop view of a port with its transmit pump
pub struct PortTransport<'p, P: TxPump, const S: usize = RING_STORE_SIZE> {
    port: &'p Port<S>,
    pump: P,
}

impl<'p, P: TxPump, const S: usize> PortTransport<'p, P, S> {
    pub fn new(port: &'p Port<S>, pump: P) -> Self {
        Self { port, pump }
    }

    pub fn port(&self) -> &'p Port<S> {
        self.port
    }
}

impl<P: TxPump, const S: usize> Inbound for PortTransport<'_, P, S> {
    fn read(&self, buf: &mut [u8]) -> usize {
        self.port.read(buf)
    }
}

impl<P: TxPump, const S: usize> Outbound for PortTransport<'_, P, S> {
    fn write(&self, bytes: &[u8]) {
        if self.port.queue(bytes) {
            trace!("tx latch idle, arming pump");
            self.pump.arm();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use heapless::Vec;

    /// Serial-style transmitter: one byte per interrupt
    #[derive(Default)]
    struct SerialTx {
        wire: Vec<u8, 256>,
        enabled: bool,
    }

    impl TxHardware for SerialTx {
        const CHUNK: usize = SERIAL_CHUNK;

        fn transmit(&mut self, chunk: &[u8]) {
            self.wire.extend_from_slice(chunk).unwrap();
        }

        fn idle(&mut self) {
            self.enabled = false;
        }
    }

    /// USB-style transmitter: records packet sizes
    #[derive(Default)]
    struct UsbTx {
        packets: Vec<usize, 16>,
    }

    impl TxHardware for UsbTx {
        const CHUNK: usize = USB_PACKET_SIZE;

        fn transmit(&mut self, chunk: &[u8]) {
            self.packets.push(chunk.len()).unwrap();
        }

        fn idle(&mut self) {}
    }

    struct CountingPump<'a>(&'a Cell<u32>);

    impl TxPump for CountingPump<'_> {
        fn arm(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_first_queue_arms_then_latch_holds() {
        let port: Port = Port::new();
        assert!(port.queue(&[1, 2]));
        assert!(port.is_transmitting());
        assert!(!port.queue(&[3]));
    }

    #[test]
    fn test_serial_drains_byte_by_byte() {
        let port: Port = Port::new();
        let mut hw = SerialTx {
            enabled: true,
            ..Default::default()
        };
        port.queue(b"abc");

        while port.service_tx(&mut hw) > 0 {}

        assert_eq!(&hw.wire[..], b"abc");
        assert!(!hw.enabled);
        assert!(!port.is_transmitting());
    }

    #[test]
    fn test_usb_sends_packets_of_64() {
        let port: Port<200> = Port::new();
        let mut hw = UsbTx::default();
        port.queue(&[0x55; 150]);

        while port.service_tx(&mut hw) > 0 {}

        assert_eq!(&hw.packets[..], &[64, 64, 22]);
        assert!(!port.is_transmitting());
    }

    #[test]
    fn test_latch_rearms_after_drain() {
        let port: Port = Port::new();
        let arms = Cell::new(0);
        let transport = PortTransport::new(&port, CountingPump(&arms));
        let mut hw = SerialTx::default();

        transport.write(&[1]);
        transport.write(&[2]);
        assert_eq!(arms.get(), 1);

        while port.service_tx(&mut hw) > 0 {}
        transport.write(&[3]);
        assert_eq!(arms.get(), 2);
    }

    #[test]
    fn test_queue_never_splits_a_frame() {
        let port: Port<8> = Port::new();
        assert!(port.queue(&[1, 2, 3, 4]));
        assert!(!port.queue(&[5, 6, 7, 8]));
        assert_eq!(port.tx_overruns().events, 1);
        assert_eq!(port.tx_overruns().bytes, 4);

        let mut buf = [0u8; 8];
        assert_eq!(port.tx().get(&mut buf), 4);
        assert_eq!(&buf[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_rejected_frame_leaves_idle_latch_alone() {
        let port: Port<8> = Port::new();
        assert!(!port.queue(&[0; 8]));
        assert!(!port.is_transmitting());
        assert!(port.tx().is_empty());
    }

    #[test]
    fn test_receive_then_read() {
        let port: Port = Port::new();
        let arms = Cell::new(0);
        let transport = PortTransport::new(&port, CountingPump(&arms));
        port.receive(&[9, 8, 7]);

        let mut buf = [0u8; 8];
        assert_eq!(transport.read(&mut buf), 3);
        assert_eq!(&buf[..3], &[9, 8, 7]);
    }

    #[test]
    fn test_rx_overrun_counted() {
        let port: Port<5> = Port::new();
        port.receive(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(port.rx_overruns().bytes, 2);
        assert_eq!(port.rx().len(), 4);
    }

    #[test]
    fn test_reset_clears_everything() {
        let port: Port = Port::new();
        port.receive(&[1]);
        port.queue(&[2]);
        port.reset();
        assert!(port.rx().is_empty());
        assert!(port.tx().is_empty());
        assert!(!port.is_transmitting());
    }
}
