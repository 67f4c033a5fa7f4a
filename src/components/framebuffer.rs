//! Fixed-size glyph grids.
//!
//! A [`FrameBuffer`] is one still image of an animation. Destination surfaces
//! that frames are composited onto implement [`RenderSurface`]; the frame
//! buffer itself does, so frames can be stacked onto a larger buffer.

use serde::{Deserialize, Serialize};

use crate::components::glyph::{Color, Glyph};

/// A grid of cells that frames can be copied onto.
pub trait RenderSurface {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    /// Writes `glyph` at `(x, y)`. Coordinates are already clipped by the caller.
    fn set_cell(&mut self, x: i32, y: i32, glyph: &Glyph);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameBuffer {
    width: i32,
    height: i32,
    pub default_foreground: Color,
    pub default_background: Color,
    cells: Vec<Glyph>,
}

impl FrameBuffer {
    /// Creates a `width`×`height` buffer of blank cells in the default colors.
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_colors(width, height, Color::WHITE, Color::TRANSPARENT)
    }

    pub fn with_colors(width: i32, height: i32, foreground: Color, background: Color) -> Self {
        let (width, height) = (width.max(0), height.max(0));
        Self {
            width,
            height,
            default_foreground: foreground,
            default_background: background,
            cells: vec![Glyph::blank(foreground, background); (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn cells(&self) -> &[Glyph] {
        &self.cells
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some((y * self.width + x) as usize)
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Glyph> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Glyph> {
        self.index(x, y).map(move |i| &mut self.cells[i])
    }

    /// Sets the glyph index of a cell. Out-of-range coordinates are ignored.
    pub fn set_glyph(&mut self, x: i32, y: i32, glyph: i32) {
        if let Some(cell) = self.get_mut(x, y) {
            cell.glyph = glyph;
        }
    }

    pub fn set_foreground(&mut self, x: i32, y: i32, color: Color) {
        if let Some(cell) = self.get_mut(x, y) {
            cell.foreground = color;
        }
    }

    pub fn set_background(&mut self, x: i32, y: i32, color: Color) {
        if let Some(cell) = self.get_mut(x, y) {
            cell.background = color;
        }
    }

    /// Overwrites every cell with `glyph`.
    pub fn fill(&mut self, glyph: &Glyph) {
        for cell in &mut self.cells {
            cell.clone_from(glyph);
        }
    }

    /// Resets every cell to a blank glyph in the default colors.
    pub fn clear(&mut self) {
        let blank = Glyph::blank(self.default_foreground, self.default_background);
        self.fill(&blank);
    }

    /// Changes the size of the buffer. Cells inside the overlap of the old and
    /// new sizes keep their content; new cells are blank.
    pub fn resize(&mut self, width: i32, height: i32) {
        let (width, height) = (width.max(0), height.max(0));
        if width == self.width && height == self.height {
            return;
        }
        let blank = Glyph::blank(self.default_foreground, self.default_background);
        let mut cells = vec![blank; (width * height) as usize];
        for y in 0..height.min(self.height) {
            for x in 0..width.min(self.width) {
                let old = (y * self.width + x) as usize;
                cells[(y * width + x) as usize] = std::mem::take(&mut self.cells[old]);
            }
        }
        self.width = width;
        self.height = height;
        self.cells = cells;
    }

    /// Copies the visible cells of this buffer onto `dest` with the top-left
    /// corner at `(dest_x, dest_y)`, clipping at the destination's bounds.
    pub fn copy_to<S: RenderSurface + ?Sized>(&self, dest: &mut S, dest_x: i32, dest_y: i32) {
        let (dw, dh) = (dest.width(), dest.height());
        for y in 0..self.height {
            let ty = dest_y + y;
            if ty < 0 || ty >= dh {
                continue;
            }
            for x in 0..self.width {
                let tx = dest_x + x;
                if tx < 0 || tx >= dw {
                    continue;
                }
                let cell = &self.cells[(y * self.width + x) as usize];
                if cell.visible {
                    dest.set_cell(tx, ty, cell);
                }
            }
        }
    }
}

impl RenderSurface for FrameBuffer {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn set_cell(&mut self, x: i32, y: i32, glyph: &Glyph) {
        if let Some(cell) = self.get_mut(x, y) {
            cell.clone_from(glyph);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_blank() {
        let fb = FrameBuffer::new(3, 2);
        assert_eq!(fb.cells().len(), 6);
        assert!(fb.cells().iter().all(|c| c.glyph == 0 && c.visible));
    }

    #[test]
    fn test_out_of_range_writes_are_ignored() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.set_glyph(5, 5, 65);
        fb.set_glyph(-1, 0, 65);
        assert!(fb.cells().iter().all(|c| c.glyph == 0));
        assert!(fb.get(2, 0).is_none());
    }

    #[test]
    fn test_resize_keeps_overlap() {
        let mut fb = FrameBuffer::new(3, 3);
        fb.set_glyph(0, 0, 1);
        fb.set_glyph(1, 1, 2);
        fb.set_glyph(2, 2, 3);
        fb.resize(2, 4);
        assert_eq!(fb.width(), 2);
        assert_eq!(fb.height(), 4);
        assert_eq!(fb.get(0, 0).map(|c| c.glyph), Some(1));
        assert_eq!(fb.get(1, 1).map(|c| c.glyph), Some(2));
        assert_eq!(fb.get(1, 3).map(|c| c.glyph), Some(0));
    }

    #[test]
    fn test_copy_to_clips_and_skips_invisible() {
        let mut src = FrameBuffer::new(2, 2);
        src.set_glyph(0, 0, 10);
        src.set_glyph(1, 0, 11);
        src.set_glyph(0, 1, 12);
        src.set_glyph(1, 1, 13);
        if let Some(cell) = src.get_mut(0, 1) {
            cell.visible = false;
        }

        let mut dest = FrameBuffer::new(3, 3);
        dest.set_glyph(1, 2, 99);
        src.copy_to(&mut dest, 1, 1);
        assert_eq!(dest.get(1, 1).map(|c| c.glyph), Some(10));
        assert_eq!(dest.get(2, 1).map(|c| c.glyph), Some(11));
        // invisible source cell leaves the destination untouched
        assert_eq!(dest.get(1, 2).map(|c| c.glyph), Some(99));
        assert_eq!(dest.get(2, 2).map(|c| c.glyph), Some(13));

        let mut small = FrameBuffer::new(1, 1);
        src.copy_to(&mut small, -1, -1);
        assert_eq!(small.get(0, 0).map(|c| c.glyph), Some(13));
    }
}
