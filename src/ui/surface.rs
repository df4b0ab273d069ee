//! Character-cell display surface
//!
//! The control loop and renderer only talk to a [`Surface`]. Writes are
//! staged; nothing reaches the physical display until [`Surface::show`].

use std::io;

use crossterm::style::Color;

/// Foreground/background pair used for every cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellStyle {
    pub fg: Color,
    pub bg: Color,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            fg: Color::Reset,
            bg: Color::Reset,
        }
    }
}

/// A staged character and its style
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StyledChar {
    pub ch: char,
    pub style: CellStyle,
}

impl StyledChar {
    pub const fn blank(style: CellStyle) -> Self {
        Self { ch: ' ', style }
    }
}

pub trait Surface {
    /// Current size as (cols, rows)
    fn size(&self) -> (u16, u16);

    /// Stage one cell. Positions outside the surface are ignored.
    fn set_cell(&mut self, col: u16, row: u16, ch: char, style: CellStyle);

    /// Make everything staged so far visible
    fn show(&mut self) -> io::Result<()>;

    /// Re-read the geometry after a resize and repaint everything on the
    /// next `show`
    fn sync(&mut self) -> io::Result<()>;
}

/// Staging buffer shared by the backends.
///
/// Tracks which cells changed since the last flush.
pub(crate) struct CellBuffer {
    cols: u16,
    rows: u16,
    cells: Vec<StyledChar>,
    dirty: Vec<bool>,
    blank: StyledChar,
}

impl CellBuffer {
    pub fn new(cols: u16, rows: u16, blank: StyledChar) -> Self {
        let len = cols as usize * rows as usize;
        Self {
            cols,
            rows,
            cells: vec![blank; len],
            dirty: vec![true; len],
            blank,
        }
    }

    pub fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    fn index(&self, col: u16, row: u16) -> Option<usize> {
        (col < self.cols && row < self.rows).then(|| row as usize * self.cols as usize + col as usize)
    }

    pub fn get(&self, col: u16, row: u16) -> Option<StyledChar> {
        self.index(col, row).map(|i| self.cells[i])
    }

    pub fn set(&mut self, col: u16, row: u16, cell: StyledChar) {
        if let Some(i) = self.index(col, row) {
            if self.cells[i] != cell {
                self.cells[i] = cell;
                self.dirty[i] = true;
            }
        }
    }

    /// Reallocate to a new size keeping the overlapping region; everything
    /// is marked dirty.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        let mut next = Self::new(cols, rows, self.blank);
        for row in 0..self.rows.min(rows) {
            for col in 0..self.cols.min(cols) {
                if let Some(cell) = self.get(col, row) {
                    next.set(col, row, cell);
                }
            }
        }
        next.dirty.iter_mut().for_each(|d| *d = true);
        *self = next;
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty.iter_mut().for_each(|d| *d = true);
    }

    /// Drain dirty cells as (col, row, cell), row by row
    pub fn take_dirty(&mut self) -> Vec<(u16, u16, StyledChar)> {
        let cols = self.cols.max(1) as usize;
        let mut out = Vec::new();
        for (i, dirty) in self.dirty.iter_mut().enumerate() {
            if *dirty {
                *dirty = false;
                out.push(((i % cols) as u16, (i / cols) as u16, self.cells[i]));
            }
        }
        out
    }
}

/// In-memory surface for driving the loop without a terminal
#[cfg(test)]
pub struct MemorySurface {
    buffer: CellBuffer,
    pending_size: Option<(u16, u16)>,
    /// Text of every row at each `show`
    pub frames: Vec<Vec<String>>,
    pub syncs: usize,
}

#[cfg(test)]
impl MemorySurface {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            buffer: CellBuffer::new(cols, rows, StyledChar::blank(CellStyle::default())),
            pending_size: None,
            frames: Vec::new(),
            syncs: 0,
        }
    }

    /// Simulate the window changing size; picked up by the next `sync`
    pub fn resize_window(&mut self, cols: u16, rows: u16) {
        self.pending_size = Some((cols, rows));
    }

    pub fn char_at(&self, col: u16, row: u16) -> Option<char> {
        self.buffer.get(col, row).map(|c| c.ch)
    }

    pub fn style_at(&self, col: u16, row: u16) -> Option<CellStyle> {
        self.buffer.get(col, row).map(|c| c.style)
    }

    pub fn row_text(&self, row: u16) -> String {
        (0..self.buffer.size().0)
            .filter_map(|col| self.char_at(col, row))
            .collect()
    }

    pub fn last_frame(&self) -> Option<&Vec<String>> {
        self.frames.last()
    }
}

#[cfg(test)]
impl Surface for MemorySurface {
    fn size(&self) -> (u16, u16) {
        self.buffer.size()
    }

    fn set_cell(&mut self, col: u16, row: u16, ch: char, style: CellStyle) {
        self.buffer.set(col, row, StyledChar { ch, style });
    }

    fn show(&mut self) -> io::Result<()> {
        self.buffer.take_dirty();
        let rows = self.buffer.size().1;
        let frame = (0..rows).map(|row| self.row_text(row)).collect();
        self.frames.push(frame);
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        if let Some((cols, rows)) = self.pending_size.take() {
            self.buffer.resize(cols, rows);
        } else {
            self.buffer.mark_all_dirty();
        }
        self.syncs += 1;
        Ok(())
    }
}
