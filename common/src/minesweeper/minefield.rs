use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::grid::{Cell, Grid};
use crate::error::{Error, Result};

/// The hidden side of the game: where the mines actually are.
///
/// Mines are given explicitly; placing them is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Minefield {
    grid: Grid,
    mines: BTreeSet<Cell>,
}

impl Minefield {
    /// Fails if a mine lies off the grid or if no mine-free cell would remain.
    pub fn new(grid: Grid, mines: impl IntoIterator<Item = Cell>) -> Result<Self> {
        let mut set = BTreeSet::new();
        for cell in mines {
            grid.check(cell)?;
            set.insert(cell);
        }
        if set.len() >= grid.len() {
            return Err(Error::TooManyMines {
                height: grid.height,
                width: grid.width,
                mines: set.len(),
            });
        }
        Ok(Minefield { grid, mines: set })
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn mines(&self) -> &BTreeSet<Cell> {
        &self.mines
    }

    pub fn is_mine(&self, cell: Cell) -> bool {
        self.mines.contains(&cell)
    }

    /// Number of mines among the neighbors of `cell`, not counting `cell`.
    pub fn nearby_mines(&self, cell: Cell) -> usize {
        self.grid
            .neighbors(cell)
            .filter(|neighbor| self.mines.contains(neighbor))
            .count()
    }

    /// True when exactly the mines have been flagged.
    pub fn won(&self, flagged: &BTreeSet<Cell>) -> bool {
        *flagged == self.mines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearby_mines() {
        let field = Minefield::new(
            Grid::new(3, 3),
            [Cell::new(0, 0), Cell::new(2, 2), Cell::new(0, 2)],
        )
        .unwrap();

        assert_eq!(field.nearby_mines(Cell::new(1, 1)), 3);
        assert_eq!(field.nearby_mines(Cell::new(0, 1)), 2);
        assert_eq!(field.nearby_mines(Cell::new(2, 0)), 0);
        // The cell itself is never counted.
        assert_eq!(field.nearby_mines(Cell::new(0, 0)), 0);
        assert!(field.is_mine(Cell::new(2, 2)));
        assert!(!field.is_mine(Cell::new(1, 1)));
    }

    #[test]
    fn test_won() {
        let mines = [Cell::new(0, 1), Cell::new(1, 0)];
        let field = Minefield::new(Grid::new(2, 2), mines).unwrap();

        assert!(field.won(&mines.into_iter().collect()));
        assert!(!field.won(&BTreeSet::from([Cell::new(0, 1)])));
        assert!(!field.won(&BTreeSet::from([
            Cell::new(0, 1),
            Cell::new(1, 0),
            Cell::new(1, 1)
        ])));
    }

    #[test]
    fn test_invalid_minefields() {
        let grid = Grid::new(2, 2);
        assert_eq!(
            Minefield::new(grid, [Cell::new(2, 0)]),
            Err(Error::CellOutOfBounds {
                row: 2,
                col: 0,
                height: 2,
                width: 2
            })
        );
        assert_eq!(
            Minefield::new(grid, grid.cells()),
            Err(Error::TooManyMines {
                height: 2,
                width: 2,
                mines: 4
            })
        );
    }

    #[test]
    fn test_serialization() {
        let field = Minefield::new(Grid::default(), [Cell::new(3, 4)]).unwrap();
        let bytes = bcs::to_bytes(&field).unwrap();
        let decoded: Minefield = bcs::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, field);
    }
}
