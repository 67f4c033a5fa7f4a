//! Decoding of physical keys into characters.
//!
//! [`AsciiKey::decode`] turns a [`Keys`] value into the character it types
//! under the live modifier state: letters honour shift XOR caps lock, the
//! digit row and punctuation have shifted symbols, and the number pad yields
//! digits with NumLock on or acts as the navigation key printed on it with
//! NumLock off. Keys that type nothing decode to `'\0'`.

use serde::{Deserialize, Serialize};

use crate::resources::keyboard::KeyboardSnapshot;
use crate::resources::keys::Keys;

/// A decoded key with its repeat bookkeeping.
///
/// Equality compares characters when either side has one and falls back to
/// the key otherwise, so the main-row `1` and the number pad `1` count as the
/// same logical key.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AsciiKey {
    pub key: Keys,
    /// `'\0'` when the key has no printable character.
    pub character: char,
    /// Seconds held since the press or the last repeat.
    pub time_held: f32,
    /// Set once the initial repeat delay has elapsed.
    pub post_initial_delay: bool,
}

impl AsciiKey {
    pub fn new(key: Keys, character: char) -> Self {
        Self {
            key,
            character,
            time_held: 0.0,
            post_initial_delay: false,
        }
    }

    /// Decodes `key` as if shift were in the state given by `shift_pressed`.
    pub fn decode(key: Keys, shift_pressed: bool, state: &KeyboardSnapshot) -> Self {
        if key.is_letter() {
            if let Some((lower, upper)) = key.shift_mapping() {
                let upper_case = shift_pressed ^ state.caps_lock;
                return Self::new(key, if upper_case { upper } else { lower });
            }
        }
        if let Some((unshifted, shifted)) = key.shift_mapping() {
            return Self::new(key, if shift_pressed { shifted } else { unshifted });
        }
        if let Some((digit, navigation)) = key.numpad_mapping() {
            return if state.num_lock {
                Self::new(key, digit)
            } else {
                Self::new(navigation, '\0')
            };
        }
        Self::new(key, '\0')
    }

    /// Decodes `key` without shift.
    pub fn get(key: Keys, state: &KeyboardSnapshot) -> Self {
        Self::decode(key, false, state)
    }

    pub fn has_character(&self) -> bool {
        self.character != '\0'
    }
}

impl PartialEq for AsciiKey {
    fn eq(&self, other: &Self) -> bool {
        if self.has_character() || other.has_character() {
            self.character == other.character
        } else {
            self.key == other.key
        }
    }
}

/// Compares the (possibly remapped) key only.
impl PartialEq<Keys> for AsciiKey {
    fn eq(&self, other: &Keys) -> bool {
        self.key == *other
    }
}
