//! Cell contents: colors, glyph indices and decorators.

use serde::{Deserialize, Serialize};

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Scales the RGB channels, keeping alpha.
    pub fn scaled(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        Self {
            r: (self.r as f32 * f) as u8,
            g: (self.g as f32 * f) as u8,
            b: (self.b as f32 * f) as u8,
            a: self.a,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mirror {
    #[default]
    None,
    Horizontal,
    Vertical,
}

/// Extra glyph drawn on top of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellDecorator {
    pub color: Color,
    pub glyph: i32,
    pub mirror: Mirror,
}

/// One cell of a [`FrameBuffer`](crate::components::framebuffer::FrameBuffer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glyph {
    pub foreground: Color,
    pub background: Color,
    pub glyph: i32,
    #[serde(default)]
    pub mirror: Mirror,
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<CellDecorator>,
}

impl Glyph {
    pub fn new(foreground: Color, background: Color, glyph: i32) -> Self {
        Self {
            foreground,
            background,
            glyph,
            mirror: Mirror::None,
            visible: true,
            decorators: Vec::new(),
        }
    }

    /// An empty cell (glyph index 0) in the given colors.
    pub fn blank(foreground: Color, background: Color) -> Self {
        Self::new(foreground, background, 0)
    }
}

impl Default for Glyph {
    fn default() -> Self {
        Self::blank(Color::WHITE, Color::TRANSPARENT)
    }
}
