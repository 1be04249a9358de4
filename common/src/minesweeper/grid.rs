use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A coordinate on the minesweeper board.
///
/// Cells order row-major, so sets of cells iterate deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Cell { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Board dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    pub height: usize,
    pub width: usize,
}

impl Default for Grid {
    fn default() -> Self {
        Grid {
            height: 8,
            width: 8,
        }
    }
}

impl Grid {
    pub fn new(height: usize, width: usize) -> Self {
        Grid { height, width }
    }

    pub fn len(&self) -> usize {
        self.height * self.width
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    /// Fails with [`Error::CellOutOfBounds`] unless `cell` lies on the grid.
    pub fn check(&self, cell: Cell) -> Result<()> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(Error::CellOutOfBounds {
                row: cell.row,
                col: cell.col,
                height: self.height,
                width: self.width,
            })
        }
    }

    /// Every cell of the grid in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + use<> {
        let width = self.width;
        (0..self.height).flat_map(move |row| (0..width).map(move |col| Cell { row, col }))
    }

    /// All in-bounds cells within one row and column of `cell`, excluding
    /// `cell` itself. Handles edges and corners.
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + use<> {
        let width = self.width as isize;
        let height = self.height as isize;

        (-1..=1).flat_map(move |dr| {
            (-1..=1).filter_map(move |dc| {
                if dr == 0 && dc == 0 {
                    return None;
                }

                let row = cell.row as isize + dr;
                let col = cell.col as isize + dc;

                if row >= 0 && row < height && col >= 0 && col < width {
                    Some(Cell {
                        row: row as usize,
                        col: col as usize,
                    })
                } else {
                    None
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors() {
        let grid = Grid::new(3, 3);

        assert_eq!(grid.neighbors(Cell::new(0, 0)).count(), 3);
        assert_eq!(grid.neighbors(Cell::new(1, 1)).count(), 8);
        assert_eq!(grid.neighbors(Cell::new(0, 1)).count(), 5);

        let corner: Vec<Cell> = grid.neighbors(Cell::new(2, 2)).collect();
        assert_eq!(
            corner,
            vec![Cell::new(1, 1), Cell::new(1, 2), Cell::new(2, 1)]
        );
    }

    #[test]
    fn test_neighbors_on_a_single_row() {
        let grid = Grid::new(1, 4);
        let neighbors: Vec<Cell> = grid.neighbors(Cell::new(0, 1)).collect();
        assert_eq!(neighbors, vec![Cell::new(0, 0), Cell::new(0, 2)]);
    }

    #[test]
    fn test_cells_cover_grid() {
        let grid = Grid::new(2, 3);
        let cells: Vec<Cell> = grid.cells().collect();
        assert_eq!(cells.len(), grid.len());
        assert_eq!(cells.first(), Some(&Cell::new(0, 0)));
        assert_eq!(cells.last(), Some(&Cell::new(1, 2)));
        assert!(cells.iter().all(|&c| grid.contains(c)));
    }

    #[test]
    fn test_check_bounds() {
        let grid = Grid::default();
        assert!(grid.check(Cell::new(7, 7)).is_ok());
        assert_eq!(
            grid.check(Cell::new(8, 0)),
            Err(Error::CellOutOfBounds {
                row: 8,
                col: 0,
                height: 8,
                width: 8
            })
        );
    }
}
