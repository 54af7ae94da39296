use std::fmt;

use serde::{Deserialize, Serialize};

use crate::StateError;

/// Widest state a `u64` bitmask can hold.
pub const MAX_SUPPORTED_HEIGHT: u32 = 64;

/// Gaps of ten or more are written as letters, `10 -> 'a'`, `11 -> 'b'`, ...
const GAP_ALPHABET_OFFSET: u32 = 87;

/// A juggling state as a bitmask over `max_height` landing slots.
///
/// Bit `max_height - 1` is the leftmost slot of the binary label, bit 0 the
/// rightmost. The width is not stored; every operation that renders or
/// validates a state takes `max_height` explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JugglingState(u64);

impl JugglingState {
    /// Wraps raw bits without checking them against any width.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub fn new(bits: u64, max_height: u32) -> Result<Self, StateError> {
        if max_height > MAX_SUPPORTED_HEIGHT {
            return Err(StateError::HeightTooLarge { max_height });
        }
        if max_height < MAX_SUPPORTED_HEIGHT && bits >> max_height != 0 {
            return Err(StateError::BitsOutOfRange { bits, max_height });
        }
        Ok(Self(bits))
    }

    /// The canonical state with every prop queued: the `num_props` least
    /// significant bits set.
    pub fn ground(num_props: u32) -> Self {
        if num_props >= MAX_SUPPORTED_HEIGHT {
            Self(u64::MAX)
        } else {
            Self((1u64 << num_props) - 1)
        }
    }

    pub fn ground_checked(num_props: u32, max_height: u32) -> Result<Self, StateError> {
        if max_height > MAX_SUPPORTED_HEIGHT {
            return Err(StateError::HeightTooLarge { max_height });
        }
        if num_props > max_height {
            return Err(StateError::TooManyProps {
                num_props,
                max_height,
            });
        }
        Ok(Self::ground(num_props))
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub fn occupied(self, pos: u32) -> bool {
        pos < MAX_SUPPORTED_HEIGHT && (self.0 >> pos) & 1 != 0
    }

    pub fn num_props(self) -> u32 {
        self.0.count_ones()
    }
}

impl fmt::Display for JugglingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for JugglingState {
    fn from(bits: u64) -> Self {
        Self(bits)
    }
}

/// Fixed-width binary label, most significant slot first.
///
/// With `reversed` the digits are printed back to front, so bit 0 comes
/// first. Callers must keep `state` below `2^max_height`. A zero width has no
/// slots and yields an empty label.
pub fn to_binary_label(state: JugglingState, max_height: u32, reversed: bool) -> String {
    if max_height == 0 {
        return String::new();
    }
    let width = max_height as usize;
    let binary = format!("{:0width$b}", state.bits());
    if reversed {
        binary.chars().rev().collect()
    } else {
        binary
    }
}

/// Run-length "gap" label.
///
/// Walks slots from `max_height - 1` down to 0 and, at each occupied slot,
/// emits the number of empty slots seen since the previous occupied one.
/// Trailing empty slots are dropped, so the label cannot be parsed back into
/// a state without knowing the width.
pub fn to_abbreviated_label(state: JugglingState, max_height: u32) -> String {
    let mut label = String::new();
    let mut gap = 0u32;
    for pos in (0..max_height).rev() {
        if state.occupied(pos) {
            label.push(gap_char(gap));
            gap = 0;
        } else {
            gap += 1;
        }
    }
    label
}

fn gap_char(gap: u32) -> char {
    if gap < 10 {
        char::from_digit(gap, 10).unwrap_or('?')
    } else {
        char::from_u32(GAP_ALPHABET_OFFSET + gap).unwrap_or('?')
    }
}

/// Presentation flags that choose how states are labelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelFlags {
    pub reversed: bool,
    pub abbreviated: bool,
}

impl LabelFlags {
    pub const PLAIN: Self = Self {
        reversed: false,
        abbreviated: false,
    };

    /// `abbreviated` takes precedence; `reversed` only affects binary labels.
    pub fn label(self, state: JugglingState, max_height: u32) -> String {
        if self.abbreviated {
            to_abbreviated_label(state, max_height)
        } else {
            to_binary_label(state, max_height, self.reversed)
        }
    }
}
