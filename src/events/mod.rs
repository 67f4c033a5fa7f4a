//! Event types triggered by the engine's systems.
//!
//! Submodules:
//! - [`input`] – key presses (first and repeated) and releases
//! - [`entitymanager`] – movement, zone, hotspot and animation events from entity managers
//! - [`animation`] – animation state changes of free-standing grid entities
pub mod animation;
pub mod entitymanager;
pub mod input;
