//! ECS components and the data they own.
//!
//! Submodules overview:
//! - [`glyph`] – colors, glyph indices and cell decorators
//! - [`framebuffer`] – fixed-size glyph grids and the [`RenderSurface`](framebuffer::RenderSurface) trait
//! - [`animation`] – frame sequences with mutate-then-commit playback
//! - [`gridentity`] – positioned objects with named animations
//! - [`container`] – host surface with an optional viewport
//! - [`entitymanager`] – zone/hotspot tracking for owned grid entities

pub mod animation;
pub mod container;
pub mod entitymanager;
pub mod framebuffer;
pub mod glyph;
pub mod gridentity;
