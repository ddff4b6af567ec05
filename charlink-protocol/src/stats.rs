//! Protocol health counters.

/// Counters kept by the frame decoder, reset only at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProtocolStats {
    /// Decode passes started
    pub decode_passes: u32,
    /// Bytes discarded because no command has that id
    pub bad_id: u32,
    /// Bytes discarded because the declared payload was too short
    pub bad_size_below_min: u32,
    /// Bytes discarded because the declared payload was too long
    pub bad_size_above_max: u32,
    /// Bytes discarded because the checksum did not match
    pub bad_checksum: u32,
    /// Passes that stopped waiting for the rest of a frame
    pub incomplete: u32,
    /// Handlers invoked
    pub dispatched: u32,
    /// Handlers that returned
    pub dispatched_completed: u32,
}

impl ProtocolStats {
    pub const fn new() -> Self {
        Self {
            decode_passes: 0,
            bad_id: 0,
            bad_size_below_min: 0,
            bad_size_above_max: 0,
            bad_checksum: 0,
            incomplete: 0,
            dispatched: 0,
            dispatched_completed: 0,
        }
    }

    /// All size rejections
    pub fn bad_size(&self) -> u32 {
        self.bad_size_below_min
            .saturating_add(self.bad_size_above_max)
    }

    /// Total bytes dropped while resynchronising
    pub fn resync_discards(&self) -> u32 {
        self.bad_id
            .saturating_add(self.bad_size())
            .saturating_add(self.bad_checksum)
    }
}

pub(crate) fn bump(counter: &mut u32) {
    *counter = counter.saturating_add(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        assert_eq!(ProtocolStats::new(), ProtocolStats::default());
        assert_eq!(ProtocolStats::new().resync_discards(), 0);
    }

    #[test]
    fn test_resync_total() {
        let mut stats = ProtocolStats::new();
        bump(&mut stats.bad_id);
        bump(&mut stats.bad_size_below_min);
        bump(&mut stats.bad_size_above_max);
        bump(&mut stats.bad_checksum);
        bump(&mut stats.incomplete);
        assert_eq!(stats.bad_size(), 2);
        assert_eq!(stats.resync_discards(), 4);
    }

    #[test]
    fn test_counters_saturate() {
        let mut counter = u32::MAX;
        bump(&mut counter);
        assert_eq!(counter, u32::MAX);
    }
}
