//! Keypad state
//!
//! Keys are reported in the host protocol's bit layout, independent of which
//! GPIO lines the board wires them to.

use core::ops::{BitAnd, BitOr, Not};

use crate::gpio::InputPin;

/// Set of keys, one bit per key in protocol order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Keys(u8);

impl Keys {
    pub const NONE: Keys = Keys(0x00);
    pub const UP: Keys = Keys(0x01);
    pub const ENTER: Keys = Keys(0x02);
    pub const CANCEL: Keys = Keys(0x04);
    pub const LEFT: Keys = Keys(0x08);
    pub const RIGHT: Keys = Keys(0x10);
    pub const DOWN: Keys = Keys(0x20);
    pub const ALL: Keys = Keys(0x3F);

    /// Build a key set from raw bits, ignoring bits that name no key
    pub const fn from_bits(bits: u8) -> Self {
        Keys(bits & Self::ALL.0)
    }

    /// Raw protocol bits
    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every key in `other` is also in `self`
    pub const fn contains(self, other: Keys) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitAnd for Keys {
    type Output = Keys;

    fn bitand(self, rhs: Keys) -> Keys {
        Keys(self.0 & rhs.0)
    }
}

impl BitOr for Keys {
    type Output = Keys;

    fn bitor(self, rhs: Keys) -> Keys {
        Keys(self.0 | rhs.0)
    }
}

impl Not for Keys {
    type Output = Keys;

    fn not(self) -> Keys {
        Keys(!self.0 & Self::ALL.0)
    }
}

/// Source of the current keypad state
pub trait Keypad {
    /// Sample which keys are held down right now
    fn read(&mut self) -> Keys;
}

/// Keypad built from six discrete input lines (active high)
pub struct KeyLines<P: InputPin> {
    pub up: P,
    pub down: P,
    pub left: P,
    pub right: P,
    pub enter: P,
    pub cancel: P,
}

impl<P: InputPin> KeyLines<P> {
    fn line(pin: &P, key: Keys) -> Keys {
        if pin.is_high() {
            key
        } else {
            Keys::NONE
        }
    }
}

impl<P: InputPin> Keypad for KeyLines<P> {
    fn read(&mut self) -> Keys {
        Self::line(&self.up, Keys::UP)
            | Self::line(&self.down, Keys::DOWN)
            | Self::line(&self.left, Keys::LEFT)
            | Self::line(&self.right, Keys::RIGHT)
            | Self::line(&self.enter, Keys::ENTER)
            | Self::line(&self.cancel, Keys::CANCEL)
    }
}
