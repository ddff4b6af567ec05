//! Keypad polling and key activity reports.
//!
//! Two independent edge trackers look at the same keys:
//! - [`PollState`] answers the read-keypad command, comparing against the
//!   state seen by the previous read-keypad
//! - [`KeyReporter`] produces unsolicited reports, comparing against the
//!   state seen by the previous main-loop pass
//!
//! Neither disturbs the other's notion of "last".

use charlink_hal::Keys;
use heapless::Vec;

/// Command byte of unsolicited key activity reports
pub const KEY_ACTIVITY_REPORT: u8 = 0x80;

/// Payload of a read-keypad reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeypadReport {
    /// Keys held right now
    pub pressed: Keys,
    /// Keys that went down since the previous read
    pub pressed_since_last: Keys,
    /// Keys that came up since the previous read
    pub released_since_last: Keys,
}

impl KeypadReport {
    /// Wire layout: pressed, pressed since last, released since last
    pub fn to_bytes(&self) -> [u8; 3] {
        [
            self.pressed.bits(),
            self.pressed_since_last.bits(),
            self.released_since_last.bits(),
        ]
    }
}

/// Last keypad state seen by read-keypad
#[derive(Debug, Clone, Copy, Default)]
pub struct PollState {
    last: Keys,
}

impl PollState {
    pub const fn new() -> Self {
        Self { last: Keys::NONE }
    }

    /// Compare `current` with the previous poll and remember it
    pub fn poll(&mut self, current: Keys) -> KeypadReport {
        let report = KeypadReport {
            pressed: current,
            pressed_since_last: !self.last & current,
            released_since_last: self.last & !current,
        };
        self.last = current;
        report
    }
}

/// One key edge, numbered the way the host expects in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum KeyEvent {
    UpPress = 1,
    DownPress = 2,
    LeftPress = 3,
    RightPress = 4,
    EnterPress = 5,
    CancelPress = 6,
    UpRelease = 7,
    DownRelease = 8,
    LeftRelease = 9,
    RightRelease = 10,
    EnterRelease = 11,
    CancelRelease = 12,
}

impl KeyEvent {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Report order, with the press and release event for each key
const REPORT_ORDER: [(Keys, KeyEvent, KeyEvent); 6] = [
    (Keys::UP, KeyEvent::UpPress, KeyEvent::UpRelease),
    (Keys::DOWN, KeyEvent::DownPress, KeyEvent::DownRelease),
    (Keys::LEFT, KeyEvent::LeftPress, KeyEvent::LeftRelease),
    (Keys::RIGHT, KeyEvent::RightPress, KeyEvent::RightRelease),
    (Keys::ENTER, KeyEvent::EnterPress, KeyEvent::EnterRelease),
    (Keys::CANCEL, KeyEvent::CancelPress, KeyEvent::CancelRelease),
];

/// Upper bound on events from one update
pub const MAX_KEY_EVENTS: usize = 12;

/// Edge detector for unsolicited key reports
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyReporter {
    press_mask: Keys,
    release_mask: Keys,
    last: Keys,
}

impl KeyReporter {
    /// Reporter with every report disabled
    pub const fn new() -> Self {
        Self {
            press_mask: Keys::NONE,
            release_mask: Keys::NONE,
            last: Keys::NONE,
        }
    }

    /// Choose which keys report presses and which report releases
    pub fn configure(&mut self, press_mask: Keys, release_mask: Keys) {
        self.press_mask = press_mask;
        self.release_mask = release_mask;
    }

    pub fn press_mask(&self) -> Keys {
        self.press_mask
    }

    pub fn release_mask(&self) -> Keys {
        self.release_mask
    }

    /// Edges since the previous update, in report order
    ///
    /// The state is tracked even for keys that are masked off, so enabling
    /// a mask later does not produce stale edges.
    pub fn update(&mut self, current: Keys) -> Vec<KeyEvent, MAX_KEY_EVENTS> {
        let pressed = !self.last & current & self.press_mask;
        let released = self.last & !current & self.release_mask;
        self.last = current;

        let mut events = Vec::new();
        for (key, press, _) in REPORT_ORDER {
            if pressed.contains(key) {
                let _ = events.push(press);
            }
        }
        for (key, _, release) in REPORT_ORDER {
            if released.contains(key) {
                let _ = events.push(release);
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_edges_between_reads() {
        let mut state = PollState::new();
        let a = Keys::UP | Keys::LEFT;
        let b = Keys::LEFT | Keys::ENTER;

        let first = state.poll(a);
        assert_eq!(first.pressed_since_last, a);
        assert_eq!(first.released_since_last, Keys::NONE);

        let second = state.poll(b);
        assert_eq!(second.pressed, b);
        assert_eq!(second.pressed_since_last, !a & b);
        assert_eq!(second.released_since_last, a & !b);
        assert_eq!(second.to_bytes(), [0x0A, 0x02, 0x01]);
    }

    #[test]
    fn test_reporter_disabled_by_default() {
        let mut reporter = KeyReporter::new();
        assert!(reporter.update(Keys::ALL).is_empty());
        assert!(reporter.update(Keys::NONE).is_empty());
    }

    #[test]
    fn test_reporter_press_and_release_codes() {
        let mut reporter = KeyReporter::new();
        reporter.configure(Keys::ALL, Keys::ALL);

        let events = reporter.update(Keys::DOWN | Keys::CANCEL);
        assert_eq!(&events[..], &[KeyEvent::DownPress, KeyEvent::CancelPress]);

        let events = reporter.update(Keys::CANCEL);
        assert_eq!(&events[..], &[KeyEvent::DownRelease]);
        assert_eq!(events[0].code(), 8);
    }

    #[test]
    fn test_reporter_masks_filter_edges() {
        let mut reporter = KeyReporter::new();
        reporter.configure(Keys::UP, Keys::NONE);

        let events = reporter.update(Keys::UP | Keys::RIGHT);
        assert_eq!(&events[..], &[KeyEvent::UpPress]);
        assert!(reporter.update(Keys::NONE).is_empty());
    }

    #[test]
    fn test_reporter_ignores_poll_state() {
        let mut state = PollState::new();
        let mut reporter = KeyReporter::new();
        reporter.configure(Keys::ALL, Keys::ALL);

        state.poll(Keys::ENTER);
        let events = reporter.update(Keys::ENTER);
        assert_eq!(&events[..], &[KeyEvent::EnterPress]);
    }
}
