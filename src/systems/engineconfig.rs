//! Engine configuration change detection system.
//!
//! Monitors [`EngineConfig`] and pushes its keyboard repeat delays into the
//! [`Keyboard`] resource when the config is inserted or modified.

use bevy_ecs::prelude::*;
use log::debug;

use crate::resources::engineconfig::EngineConfig;
use crate::resources::keyboard::Keyboard;

/// System that applies engine configuration changes.
///
/// # Resource Dependencies
/// - `EngineConfig` (optional) - the configuration to monitor
/// - `Keyboard` (mutable) - receives the repeat delays
pub fn apply_engine_config(maybe_config: Option<Res<EngineConfig>>, mut keyboard: ResMut<Keyboard>) {
    let Some(config) = maybe_config else {
        return;
    };

    if config.is_changed() || config.is_added() {
        if keyboard.initial_repeat_delay != config.initial_repeat_delay
            || keyboard.repeat_delay != config.repeat_delay
        {
            debug!(
                "Keyboard repeat delays: {}s -> {}s initial, {}s -> {}s repeat",
                keyboard.initial_repeat_delay,
                config.initial_repeat_delay,
                keyboard.repeat_delay,
                config.repeat_delay
            );
            keyboard.initial_repeat_delay = config.initial_repeat_delay;
            keyboard.repeat_delay = config.repeat_delay;
        }
    }
}
