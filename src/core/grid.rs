//! Toroidal cell grid
//!
//! The grid is a value type. A generation is computed by [`Grid::step`],
//! which reads the current grid and builds a brand new one, so neighbour
//! counts never observe a half-updated board. A resize likewise builds a new
//! grid via [`Grid::resized`].

use super::Cell;

/// A `width × height` board whose edges wrap around in both directions.
///
/// Cells are stored row-major in one flat vector, so every row has exactly
/// `width` cells by construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid with every cell dead
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Dead; width * height],
        }
    }

    /// (width, height) in cells
    #[cfg(test)]
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    const fn index(&self, col: usize, row: usize) -> usize {
        row * self.width + col
    }

    /// Cell at (col, row), or `None` when outside the board
    pub fn get(&self, col: usize, row: usize) -> Option<Cell> {
        (col < self.width && row < self.height).then(|| self.cells[self.index(col, row)])
    }

    /// Set the cell at (col, row). Out-of-range coordinates are ignored.
    ///
    /// Returns whether the coordinate was inside the board.
    pub fn set(&mut self, col: usize, row: usize, cell: Cell) -> bool {
        if col < self.width && row < self.height {
            let idx = self.index(col, row);
            self.cells[idx] = cell;
            true
        } else {
            false
        }
    }

    #[cfg(test)]
    pub fn is_alive(&self, col: usize, row: usize) -> bool {
        self.get(col, row).map_or(false, Cell::is_alive)
    }

    /// Number of live cells
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|c| c.is_alive()).count()
    }

    /// Live neighbours of (col, row) on the torus.
    ///
    /// On boards narrower or shorter than 3 cells a wrapped neighbour may be
    /// the same cell more than once, or the cell itself; that is counted as is.
    pub fn live_neighbors(&self, col: usize, row: usize) -> u8 {
        if self.is_empty() {
            return 0;
        }
        let w = self.width as isize;
        let h = self.height as isize;
        let (x, y) = (col as isize, row as isize);

        let mut count = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = (x + dx).rem_euclid(w) as usize;
                let ny = (y + dy).rem_euclid(h) as usize;
                if self.cells[self.index(nx, ny)].is_alive() {
                    count += 1;
                }
            }
        }
        count
    }

    /// Compute the next generation.
    ///
    /// Pure: `self` is left untouched and a freshly allocated grid of the
    /// same size is returned.
    pub fn step(&self) -> Self {
        let cells = (0..self.height)
            .flat_map(|row| (0..self.width).map(move |col| (col, row)))
            .map(|(col, row)| {
                let current = self.cells[self.index(col, row)];
                current.evolve(self.live_neighbors(col, row))
            })
            .collect();

        Self {
            width: self.width,
            height: self.height,
            cells,
        }
    }

    /// Build a grid of the new size keeping the overlapping top-left region.
    ///
    /// Cells outside the old bounds start dead.
    pub fn resized(&self, width: usize, height: usize) -> Self {
        let mut grid = Self::new(width, height);
        let keep_w = self.width.min(width);
        let keep_h = self.height.min(height);

        for row in 0..keep_h {
            let src = self.index(0, row);
            let dst = grid.index(0, row);
            grid.cells[dst..dst + keep_w].copy_from_slice(&self.cells[src..src + keep_w]);
        }
        grid
    }

    /// Iterate over every position with its cell, row by row
    pub fn iter_cells(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &cell)| (i % self.width, i / self.width, cell))
    }

    /// Positions of all live cells, row by row
    #[cfg(test)]
    pub fn alive_cells(&self) -> Vec<(usize, usize)> {
        self.iter_cells()
            .filter(|(_, _, cell)| cell.is_alive())
            .map(|(col, row, _)| (col, row))
            .collect()
    }
}
