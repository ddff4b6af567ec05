//! Protocol engine
//!
//! Owns everything the main loop needs between iterations: the decoder with
//! its counters and the device with its services. Each transport brings its
//! own [`Endpoint`], so the two links never share staged bytes and replies
//! always go back out the link the request came in on.
//!
//! A main loop looks like:
//!
//! ```ignore
//! loop {
//!     engine.poll(&mut serial);
//!     engine.poll(&mut usb);
//!     engine.service_key_reports(&[serial.transport(), usb.transport()]);
//! }
//! ```

use charlink_hal::{Keypad, UserFlash};
use charlink_protocol::encoder::send_normal_response;
use charlink_protocol::frame::{HEADER_SIZE, MIN_FRAME_SIZE};
use charlink_protocol::{
    CommandTable, DecodeOutcome, FrameDecoder, Outbound, ProtocolStats, Staging, Transport,
    STAGING_SIZE,
};

use crate::config::DeviceConfig;
use crate::handlers::Device;
use crate::keypad::KEY_ACTIVITY_REPORT;
use crate::traits::CharacterDisplay;

/// One transport with its staging window
///
/// `N` must be at least one maximum-size frame.
pub struct Endpoint<T, const N: usize = STAGING_SIZE> {
    transport: T,
    staging: Staging<N>,
}

impl<T: Transport, const N: usize> Endpoint<T, N> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            staging: Staging::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Bytes received but not yet decoded
    pub fn staging(&self) -> &Staging<N> {
        &self.staging
    }
}

/// Main-loop protocol context
pub struct Engine<D, K, F> {
    decoder: FrameDecoder<'static>,
    device: Device<D, K, F>,
}

impl<D, K, F> Engine<D, K, F>
where
    D: CharacterDisplay,
    K: Keypad,
    F: UserFlash,
{
    /// Engine with the standard command set and factory settings
    pub fn new(display: D, keypad: K, flash: F) -> Self {
        Self {
            decoder: FrameDecoder::new(CommandTable::standard()),
            device: Device::new(display, keypad, flash),
        }
    }

    /// Engine with `config` applied to the device
    pub fn with_config(display: D, keypad: K, flash: F, config: &DeviceConfig) -> Self {
        Self {
            decoder: FrameDecoder::new(CommandTable::standard()),
            device: Device::with_config(display, keypad, flash, config),
        }
    }

    pub fn stats(&self) -> &ProtocolStats {
        self.decoder.stats()
    }

    pub fn device(&self) -> &Device<D, K, F> {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut Device<D, K, F> {
        &mut self.device
    }

    /// Pull what `endpoint` has received and, if anything new arrived, run
    /// one decode pass over it
    pub fn poll<T: Transport, const N: usize>(
        &mut self,
        endpoint: &mut Endpoint<T, N>,
    ) -> DecodeOutcome {
        if endpoint.staging.fill_from(&endpoint.transport) == 0 {
            return DecodeOutcome::NoCommand;
        }
        self.decoder
            .decode(&mut endpoint.staging, &mut self.device, &endpoint.transport)
    }

    /// Send a report frame for every enabled key edge to each of `outs`
    ///
    /// Returns the number of events reported.
    pub fn service_key_reports(&mut self, outs: &[&dyn Outbound]) -> usize {
        let events = self.device.key_events();
        for event in &events {
            debug!("key event {}", event);
            for out in outs {
                let mut buf = [0u8; MIN_FRAME_SIZE + 1];
                buf[0] = KEY_ACTIVITY_REPORT;
                buf[HEADER_SIZE] = event.code();
                send_normal_response(*out, &mut buf, HEADER_SIZE + 1);
            }
        }
        events.len()
    }
}
