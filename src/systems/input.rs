//! Input systems.
//!
//! - [`update_keyboard`] advances the [`Keyboard`] resource from the host's
//!   [`KeyboardSnapshot`] and triggers [`KeyPressedEvent`]/[`KeyReleasedEvent`].
use bevy_ecs::prelude::*;

use crate::events::input::{KeyPressedEvent, KeyReleasedEvent};
use crate::resources::keyboard::{Keyboard, KeyboardSnapshot};
use crate::resources::worldtime::WorldTime;

/// Advance the keyboard repeat state machine by the tick delta.
pub fn update_keyboard(
    mut keyboard: ResMut<Keyboard>,
    snapshot: Res<KeyboardSnapshot>,
    time: Res<WorldTime>,
    mut commands: Commands,
) {
    keyboard.update(time.delta, &snapshot);

    for key in keyboard.keys_released() {
        commands.trigger(KeyReleasedEvent { key: *key });
    }
    for key in keyboard.keys_pressed() {
        commands.trigger(KeyPressedEvent {
            key: *key,
            repeat: key.post_initial_delay,
        });
    }
}
