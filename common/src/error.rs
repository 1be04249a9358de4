//! Error type shared by both games.

use thiserror::Error;

/// Errors raised by board and knowledge-base operations.
///
/// Every variant is a caller error: a coordinate outside the board, a move
/// onto an occupied square, or an observation that cannot describe the grid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("move ({row}, {col}) is out of bounds (must be 0-2)")]
    MoveOutOfBounds { row: usize, col: usize },

    #[error("square ({row}, {col}) is already occupied")]
    SquareOccupied { row: usize, col: usize },

    #[error("invalid piece counts: X={x_count}, O={o_count} (must be equal or X ahead by 1)")]
    InvalidPieceCounts { x_count: usize, o_count: usize },

    #[error("board must have 9 squares, got {got}")]
    InvalidBoardLength { got: usize },

    #[error("invalid square character '{character}' at position {position}")]
    InvalidSquareCharacter { character: char, position: usize },

    #[error("cell ({row}, {col}) is outside the {height}x{width} grid")]
    CellOutOfBounds {
        row: usize,
        col: usize,
        height: usize,
        width: usize,
    },

    #[error("{count} nearby mines reported for ({row}, {col}), which has {neighbors} neighbors")]
    CountExceedsNeighbors {
        row: usize,
        col: usize,
        count: usize,
        neighbors: usize,
    },

    #[error("a {height}x{width} grid cannot hold {mines} mines")]
    TooManyMines {
        height: usize,
        width: usize,
        mines: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
