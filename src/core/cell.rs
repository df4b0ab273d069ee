//! Cell state and the life rule

/// A single cell on the board. There is no third state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cell {
    #[default]
    Dead,
    Alive,
}

impl Cell {
    pub const fn is_alive(self) -> bool {
        matches!(self, Cell::Alive)
    }

    /// Next state given the number of live neighbours (B3/S23).
    ///
    /// - a live cell survives with 2 or 3 neighbours, otherwise dies
    /// - a dead cell is born with exactly 3 neighbours
    pub const fn evolve(self, neighbors: u8) -> Self {
        match (self, neighbors) {
            (Cell::Alive, 2 | 3) => Cell::Alive,
            (Cell::Dead, 3) => Cell::Alive,
            _ => Cell::Dead,
        }
    }

    /// Character drawn for this cell on a full redraw
    pub const fn glyph(self) -> char {
        match self {
            Cell::Alive => '0',
            Cell::Dead => ' ',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underpopulation() {
        assert_eq!(Cell::Alive.evolve(0), Cell::Dead);
        assert_eq!(Cell::Alive.evolve(1), Cell::Dead);
    }

    #[test]
    fn test_survival() {
        assert_eq!(Cell::Alive.evolve(2), Cell::Alive);
        assert_eq!(Cell::Alive.evolve(3), Cell::Alive);
    }

    #[test]
    fn test_overpopulation() {
        for n in 4..=8 {
            assert_eq!(Cell::Alive.evolve(n), Cell::Dead);
        }
    }

    #[test]
    fn test_birth_only_on_three() {
        for n in 0..=8 {
            let expected = if n == 3 { Cell::Alive } else { Cell::Dead };
            assert_eq!(Cell::Dead.evolve(n), expected, "dead cell with {} neighbours", n);
        }
    }

    #[test]
    fn test_glyphs() {
        assert_eq!(Cell::Alive.glyph(), '0');
        assert_eq!(Cell::Dead.glyph(), ' ');
        assert_eq!(Cell::default(), Cell::Dead);
    }
}
