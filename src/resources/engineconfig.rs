//! Engine configuration resource.
//!
//! Settings loaded from an INI configuration file. Defaults are safe to run
//! with when the file is missing.
//!
//! # Configuration File Format
//!
//! ```ini
//! [keyboard]
//! initial_repeat_delay = 0.8
//! repeat_delay = 0.04
//!
//! [simulation]
//! width = 80
//! height = 25
//! tick_rate = 60
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::resources::keyboard::{DEFAULT_INITIAL_REPEAT_DELAY, DEFAULT_REPEAT_DELAY};

const DEFAULT_WIDTH: u32 = 80;
const DEFAULT_HEIGHT: u32 = 25;
const DEFAULT_TICK_RATE: u32 = 60;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Engine configuration resource.
///
/// The [`apply_engine_config`] system pushes the keyboard delays into the
/// [`Keyboard`](crate::resources::keyboard::Keyboard) resource whenever this
/// resource is inserted or changed.
///
/// [`apply_engine_config`]: crate::systems::engineconfig::apply_engine_config
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Seconds a key is held before it first repeats.
    pub initial_repeat_delay: f32,
    /// Seconds between repeats after the first one.
    pub repeat_delay: f32,
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Simulation ticks per second.
    pub tick_rate: u32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            initial_repeat_delay: DEFAULT_INITIAL_REPEAT_DELAY,
            repeat_delay: DEFAULT_REPEAT_DELAY,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tick_rate: DEFAULT_TICK_RATE,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Seconds per simulation tick.
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Grid size in cells, at least one cell on each axis.
    pub fn grid_size(&self) -> (i32, i32) {
        let clamp = |n: u32| n.clamp(1, i32::MAX as u32) as i32;
        (clamp(self.width), clamp(self.height))
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current values. Returns an error if the
    /// file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [keyboard] section
        if let Some(delay) = config
            .getfloat("keyboard", "initial_repeat_delay")
            .ok()
            .flatten()
        {
            self.initial_repeat_delay = delay as f32;
        }
        if let Some(delay) = config.getfloat("keyboard", "repeat_delay").ok().flatten() {
            self.repeat_delay = delay as f32;
        }

        // [simulation] section
        if let Some(width) = config.getuint("simulation", "width").ok().flatten() {
            self.width = width as u32;
        }
        if let Some(height) = config.getuint("simulation", "height").ok().flatten() {
            self.height = height as u32;
        }
        if let Some(rate) = config.getuint("simulation", "tick_rate").ok().flatten() {
            self.tick_rate = rate as u32;
        }

        info!(
            "Loaded config: {}x{} grid, tick_rate={}, key repeat {}s then every {}s",
            self.width, self.height, self.tick_rate, self.initial_repeat_delay, self.repeat_delay
        );

        Ok(())
    }

    /// Save configuration to the INI file, creating it if needed.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [keyboard] section
        config.set(
            "keyboard",
            "initial_repeat_delay",
            Some(self.initial_repeat_delay.to_string()),
        );
        config.set("keyboard", "repeat_delay", Some(self.repeat_delay.to_string()));

        // [simulation] section
        config.set("simulation", "width", Some(self.width.to_string()));
        config.set("simulation", "height", Some(self.height.to_string()));
        config.set("simulation", "tick_rate", Some(self.tick_rate.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}
