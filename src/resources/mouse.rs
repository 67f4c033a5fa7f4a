//! Mouse state in cell coordinates, as reported by the host.

use bevy_ecs::prelude::Resource;

use crate::geometry::Point;

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseState {
    /// Cell under the cursor.
    pub position: Point,
    pub left_button_down: bool,
    pub right_button_down: bool,
    pub left_clicked: bool,
    pub right_clicked: bool,
    pub scroll_wheel: i32,
}

impl MouseState {
    pub fn at(position: Point) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Same state with the position expressed relative to `origin`.
    pub fn relative_to(&self, origin: Point) -> Self {
        Self {
            position: self.position - origin,
            ..*self
        }
    }
}
