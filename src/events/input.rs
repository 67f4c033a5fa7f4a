//! Keyboard events.
//!
//! Triggered by [`update_keyboard`](crate::systems::input::update_keyboard)
//! for every key the [`Keyboard`](crate::resources::keyboard::Keyboard)
//! resource reports as pressed or released this tick. Observers can react to
//! typing without reading the resource.

use bevy_ecs::prelude::*;

use crate::resources::asciikey::AsciiKey;

/// A key was pressed, either for the first time or as a held-key repeat.
#[derive(Event, Debug, Clone, Copy)]
pub struct KeyPressedEvent {
    pub key: AsciiKey,
    /// True for repeats generated while the key is held.
    pub repeat: bool,
}

/// A previously held key was released.
#[derive(Event, Debug, Clone, Copy)]
pub struct KeyReleasedEvent {
    pub key: AsciiKey,
}
