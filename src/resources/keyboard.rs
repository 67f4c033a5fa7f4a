//! Keyboard state with press, hold and repeat tracking.
//!
//! The host writes the physical keys it sees into [`KeyboardSnapshot`] every
//! tick; [`Keyboard::update`] turns the snapshot into decoded keys:
//!
//! - a key not tracked before is a first press and lands in `keys_pressed`
//! - a key held for `initial_repeat_delay` seconds is pressed again, then
//!   every `repeat_delay` seconds while it stays down
//! - a tracked key whose physical key is no longer down lands in
//!   `keys_released`
//!
//! Shift changes while a key is held re-label its character instead of
//! starting a new press.

use bevy_ecs::prelude::Resource;
use smallvec::SmallVec;

use crate::resources::asciikey::AsciiKey;
use crate::resources::keys::Keys;

pub const DEFAULT_INITIAL_REPEAT_DELAY: f32 = 0.8;
pub const DEFAULT_REPEAT_DELAY: f32 = 0.04;

/// Raw host input for one tick.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardSnapshot {
    pub keys_down: Vec<Keys>,
    pub caps_lock: bool,
    pub num_lock: bool,
}

impl KeyboardSnapshot {
    pub fn with_keys(keys: impl IntoIterator<Item = Keys>) -> Self {
        Self {
            keys_down: keys.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn is_key_down(&self, key: Keys) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn is_key_up(&self, key: Keys) -> bool {
        !self.is_key_down(key)
    }

    pub fn shift_pressed(&self) -> bool {
        self.keys_down.iter().any(|k| k.is_shift())
    }

    pub fn press(&mut self, key: Keys) {
        if !self.is_key_down(key) {
            self.keys_down.push(key);
        }
    }

    pub fn release(&mut self, key: Keys) {
        self.keys_down.retain(|k| *k != key);
    }
}

/// A tracked key and the physical key that produced it.
#[derive(Debug, Clone, Copy)]
struct HeldKey {
    ascii: AsciiKey,
    physical: Keys,
}

#[derive(Resource, Debug, Clone)]
pub struct Keyboard {
    /// Seconds between repeats once repeating has started.
    pub repeat_delay: f32,
    /// Seconds a key must be held before it first repeats.
    pub initial_repeat_delay: f32,
    keys_pressed: SmallVec<[AsciiKey; 8]>,
    keys_released: SmallVec<[AsciiKey; 8]>,
    keys_down: Vec<HeldKey>,
    state: KeyboardSnapshot,
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_REPEAT_DELAY, DEFAULT_REPEAT_DELAY)
    }
}

impl Keyboard {
    pub fn new(initial_repeat_delay: f32, repeat_delay: f32) -> Self {
        Self {
            repeat_delay,
            initial_repeat_delay,
            keys_pressed: SmallVec::new(),
            keys_released: SmallVec::new(),
            keys_down: Vec::new(),
            state: KeyboardSnapshot::default(),
        }
    }

    /// Keys pressed this tick, including repeats. Repeats have
    /// `post_initial_delay` set.
    pub fn keys_pressed(&self) -> &[AsciiKey] {
        &self.keys_pressed
    }

    pub fn keys_released(&self) -> &[AsciiKey] {
        &self.keys_released
    }

    pub fn keys_down(&self) -> impl Iterator<Item = &AsciiKey> {
        self.keys_down.iter().map(|held| &held.ascii)
    }

    pub fn has_keys_down(&self) -> bool {
        !self.keys_down.is_empty()
    }

    pub fn has_keys_pressed(&self) -> bool {
        !self.keys_pressed.is_empty()
    }

    /// The snapshot used by the last update.
    pub fn state(&self) -> &KeyboardSnapshot {
        &self.state
    }

    /// Forgets every tracked key. The next update treats held keys as new presses.
    pub fn clear(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.keys_down.clear();
    }

    /// Advances the state machine by `delta` seconds using `snapshot`.
    pub fn update(&mut self, delta: f32, snapshot: &KeyboardSnapshot) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.state.clone_from(snapshot);

        let shift = snapshot.shift_pressed();
        let released = &mut self.keys_released;
        self.keys_down.retain(|held| {
            let up = snapshot.is_key_up(held.physical);
            if up {
                released.push(held.ascii);
            }
            !up
        });

        for &physical in &snapshot.keys_down {
            let key = AsciiKey::decode(physical, shift, snapshot);
            let opposite = AsciiKey::decode(physical, !shift, snapshot);

            let index = if let Some(i) = self.keys_down.iter().position(|h| h.ascii == key) {
                self.keys_down[i].ascii.time_held += delta;
                i
            } else if let Some(i) = self.keys_down.iter().position(|h| h.ascii == opposite) {
                let held = &mut self.keys_down[i].ascii;
                held.character = key.character;
                held.time_held += delta;
                i
            } else if let Some(i) = self.keys_down.iter().position(|h| h.physical == physical) {
                // NumLock toggled under a held number pad key.
                let held = &mut self.keys_down[i].ascii;
                held.key = key.key;
                held.character = key.character;
                held.time_held += delta;
                i
            } else {
                self.keys_down.push(HeldKey {
                    ascii: key,
                    physical,
                });
                self.keys_pressed.push(key);
                continue;
            };

            let held = &mut self.keys_down[index].ascii;
            if !held.post_initial_delay && held.time_held >= self.initial_repeat_delay {
                held.post_initial_delay = true;
                held.time_held = 0.0;
                self.keys_pressed.push(*held);
            } else if held.post_initial_delay && held.time_held >= self.repeat_delay {
                held.time_held = 0.0;
                self.keys_pressed.push(*held);
            }
        }
    }

    /// Either decoding of `key` (with or without shift) under the last snapshot.
    fn both_shifts(&self, key: Keys) -> [AsciiKey; 2] {
        [
            AsciiKey::decode(key, false, &self.state),
            AsciiKey::decode(key, true, &self.state),
        ]
    }

    pub fn is_key_down(&self, key: Keys) -> bool {
        self.both_shifts(key)
            .iter()
            .any(|k| self.is_key_down_ascii(k))
    }

    pub fn is_key_up(&self, key: Keys) -> bool {
        !self.is_key_down(key)
    }

    pub fn is_key_pressed(&self, key: Keys) -> bool {
        self.both_shifts(key)
            .iter()
            .any(|k| self.is_key_pressed_ascii(k))
    }

    pub fn is_key_released(&self, key: Keys) -> bool {
        self.both_shifts(key)
            .iter()
            .any(|k| self.is_key_released_ascii(k))
    }

    pub fn is_key_down_ascii(&self, key: &AsciiKey) -> bool {
        self.keys_down.iter().any(|held| held.ascii == *key)
    }

    pub fn is_key_up_ascii(&self, key: &AsciiKey) -> bool {
        !self.is_key_down_ascii(key)
    }

    pub fn is_key_pressed_ascii(&self, key: &AsciiKey) -> bool {
        self.keys_pressed.contains(key)
    }

    pub fn is_key_released_ascii(&self, key: &AsciiKey) -> bool {
        self.keys_released.contains(key)
    }
}
