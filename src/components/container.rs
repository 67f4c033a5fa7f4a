//! Host surface that an [`EntityManager`](crate::components::entitymanager::EntityManager)
//! is attached to.
//!
//! A container has an absolute position and a size in cells. When it shows
//! only part of a larger grid it also carries a viewport; entity offsets and
//! visibility are then derived from the viewport instead of the container
//! bounds.

use bevy_ecs::prelude::Component;

use crate::geometry::{Point, Rect};

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container {
    /// Absolute position of the container's top-left cell.
    pub position: Point,
    pub width: i32,
    pub height: i32,
    /// Visible window into the grid, in grid coordinates.
    pub viewport: Option<Rect>,
}

impl Container {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            position: Point::ZERO,
            width,
            height,
            viewport: None,
        }
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn with_viewport(mut self, viewport: Rect) -> Self {
        self.viewport = Some(viewport);
        self
    }

    /// The container's own area in local coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Moves the viewport origin, keeping its size. No-op without a viewport.
    pub fn scroll_viewport_to(&mut self, origin: Point) {
        if let Some(viewport) = self.viewport.as_mut() {
            viewport.x = origin.x;
            viewport.y = origin.y;
        }
    }
}
