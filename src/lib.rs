//! Gridsprite library.
//!
//! Animated entities on a cell grid, zone and hotspot tracking through entity
//! managers, and keyboard decoding with key repeat. Everything is exposed as
//! bevy_ecs components, resources, systems and events.

pub mod components;
pub mod error;
pub mod events;
pub mod geometry;
pub mod resources;
pub mod systems;
