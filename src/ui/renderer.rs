//! Board renderer
//!
//! Stages the status line and the grid onto a [`Surface`]. It never flushes;
//! the control loop does that once per iteration.

use crate::core::Grid;

use super::surface::{CellStyle, Surface};

/// Status text while paused
pub const PAUSED_TEXT: &str = "Paused!";
/// Status text while running
pub const RUNNING_TEXT: &str = "Runnin'";

/// Top-left corner of the status text
pub const STATUS_ANCHOR: (u16, u16) = (2, 1);

/// Drawn where a cell is placed by a click, until the next full redraw
pub const CLICK_MARKER: char = 'o';

pub struct Renderer {
    style: CellStyle,
}

impl Renderer {
    pub fn new(style: CellStyle) -> Self {
        Self { style }
    }

    #[cfg(test)]
    pub fn style(&self) -> CellStyle {
        self.style
    }

    /// Write `text` starting at (x1, y1), wrapping character by character at
    /// column `x2` back to `x1`. Stops once the row passes `y2`.
    pub fn draw_text<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        (x1, y1): (u16, u16),
        (x2, y2): (u16, u16),
        text: &str,
    ) {
        let mut row = y1;
        let mut col = x1;
        for ch in text.chars() {
            surface.set_cell(col, row, ch, self.style);
            col = col.saturating_add(1);
            if col >= x2 {
                row = row.saturating_add(1);
                col = x1;
            }
            if row > y2 {
                break;
            }
        }
    }

    /// Stage the paused/running indicator
    pub fn draw_status<S: Surface + ?Sized>(&self, surface: &mut S, running: bool) {
        let text = if running { RUNNING_TEXT } else { PAUSED_TEXT };
        let (width, _) = surface.size();
        // The box is as tall as the surface is wide
        self.draw_text(surface, STATUS_ANCHOR, (width, width), text);
    }

    /// Stage every cell of the grid
    pub fn draw_grid<S: Surface + ?Sized>(&self, surface: &mut S, grid: &Grid) {
        for (col, row, cell) in grid.iter_cells() {
            if let (Ok(col), Ok(row)) = (u16::try_from(col), u16::try_from(row)) {
                surface.set_cell(col, row, cell.glyph(), self.style);
            }
        }
    }

    /// Stage the marker for a cell placed by the pointer
    pub fn draw_marker<S: Surface + ?Sized>(&self, surface: &mut S, col: u16, row: u16) {
        surface.set_cell(col, row, CLICK_MARKER, self.style);
    }
}
