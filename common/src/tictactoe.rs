//! Tic-tac-toe board and perfect-play search.
//!
//! The search is a plain exhaustive minimax over the 3x3 board: no
//! memoization and no pruning beyond terminal positions. The whole game tree
//! has fewer than 9! leaves, so an exact answer is always cheap enough.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Side length of the board.
pub const SIZE: usize = 3;

/// Every row, column and diagonal, as `(row, col)` triples.
const LINES: [[(usize, usize); 3]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// A player's mark. `X` always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    fn to_char(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

/// A square to play on, 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub row: usize,
    pub col: usize,
}

impl Move {
    pub fn new(row: usize, col: usize) -> Self {
        Move { row, col }
    }
}

/// A 3x3 board. `None` marks an empty square.
///
/// Boards are plain values: applying a move returns a new board and leaves
/// the original untouched. Every constructor keeps the number of X marks
/// equal to, or one more than, the number of O marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board {
    squares: [[Option<Mark>; SIZE]; SIZE],
}

impl Board {
    /// The empty starting board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from explicit rows, rejecting impossible piece counts.
    pub fn from_rows(squares: [[Option<Mark>; SIZE]; SIZE]) -> Result<Self> {
        let board = Board { squares };
        let x_count = board.count(Mark::X);
        let o_count = board.count(Mark::O);
        if x_count != o_count && x_count != o_count + 1 {
            return Err(Error::InvalidPieceCounts { x_count, o_count });
        }
        Ok(board)
    }

    /// The mark on a square, or `None` if it is empty or off the board.
    pub fn get(&self, row: usize, col: usize) -> Option<Mark> {
        self.squares
            .get(row)
            .and_then(|squares| squares.get(col))
            .copied()
            .flatten()
    }

    pub fn rows(&self) -> &[[Option<Mark>; SIZE]; SIZE] {
        &self.squares
    }

    fn count(&self, mark: Mark) -> usize {
        self.squares
            .iter()
            .flatten()
            .filter(|&&square| square == Some(mark))
            .count()
    }

    /// Number of non-empty squares.
    pub fn occupied_count(&self) -> usize {
        self.squares.iter().flatten().filter(|s| s.is_some()).count()
    }

    /// The player who moves next: X on an even number of marks, O on odd.
    pub fn current_player(&self) -> Mark {
        if self.occupied_count() % 2 == 0 {
            Mark::X
        } else {
            Mark::O
        }
    }

    /// All empty squares in row-major order.
    pub fn actions(&self) -> Vec<Move> {
        (0..SIZE)
            .flat_map(|row| (0..SIZE).map(move |col| Move { row, col }))
            .filter(|mv| self.squares[mv.row][mv.col].is_none())
            .collect()
    }

    /// Returns the board after the current player marks `mv`.
    pub fn apply(&self, mv: Move) -> Result<Board> {
        if mv.row >= SIZE || mv.col >= SIZE {
            return Err(Error::MoveOutOfBounds {
                row: mv.row,
                col: mv.col,
            });
        }
        if self.squares[mv.row][mv.col].is_some() {
            return Err(Error::SquareOccupied {
                row: mv.row,
                col: mv.col,
            });
        }

        let mut next = *self;
        next.squares[mv.row][mv.col] = Some(self.current_player());
        Ok(next)
    }

    /// True if `mark` fills any row, column or diagonal.
    pub fn is_win(&self, mark: Mark) -> bool {
        LINES.iter().any(|line| {
            line.iter()
                .all(|&(row, col)| self.squares[row][col] == Some(mark))
        })
    }

    /// The winner, if any.
    ///
    /// Only the player who moved last can have just completed a line, so
    /// only that player's mark is checked.
    pub fn winner(&self) -> Option<Mark> {
        let last_mover = self.current_player().opponent();
        self.is_win(last_mover).then_some(last_mover)
    }

    pub fn is_full(&self) -> bool {
        self.squares.iter().flatten().all(Option::is_some)
    }

    /// True once someone has won or no empty squares remain.
    pub fn is_terminal(&self) -> bool {
        self.winner().is_some() || self.is_full()
    }

    /// +1 if X has won, -1 if O has won, 0 otherwise.
    pub fn utility(&self) -> i8 {
        match self.winner() {
            Some(Mark::X) => 1,
            Some(Mark::O) => -1,
            None => 0,
        }
    }
}

impl FromStr for Board {
    type Err = Error;

    /// Parses nine squares: `X`/`x`, `O`/`o`, and `.`, `_` or `-` for empty.
    /// Whitespace, `/` and `|` are ignored so rows can be laid out freely.
    fn from_str(s: &str) -> Result<Self> {
        let chars: Vec<char> = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '/' && *c != '|')
            .collect();
        if chars.len() != SIZE * SIZE {
            return Err(Error::InvalidBoardLength { got: chars.len() });
        }

        let mut squares = [[None; SIZE]; SIZE];
        for (position, &character) in chars.iter().enumerate() {
            squares[position / SIZE][position % SIZE] = match character {
                'X' | 'x' => Some(Mark::X),
                'O' | 'o' => Some(Mark::O),
                '.' | '_' | '-' => None,
                _ => {
                    return Err(Error::InvalidSquareCharacter {
                        character,
                        position,
                    });
                }
            };
        }
        Board::from_rows(squares)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.squares.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for square in row {
                write!(f, "{}", square.map_or('.', Mark::to_char))?;
            }
        }
        Ok(())
    }
}

/// The game-theoretic value of `board` under perfect play by both sides:
/// +1 forced X win, -1 forced O win, 0 draw.
///
/// X maximizes and O minimizes; the player to move picks which.
pub fn minimax_value(board: &Board) -> i8 {
    if board.is_terminal() {
        return board.utility();
    }

    let values = board
        .actions()
        .into_iter()
        .filter_map(|mv| board.apply(mv).ok())
        .map(|next| minimax_value(&next));

    let best = match board.current_player() {
        Mark::X => values.max(),
        Mark::O => values.min(),
    };
    best.unwrap_or_else(|| board.utility())
}

/// The optimal move for the player to move, or `None` on a terminal board.
///
/// Ties go to the first candidate in row-major order.
pub fn best_move(board: &Board) -> Option<Move> {
    if board.is_terminal() {
        return None;
    }

    let player = board.current_player();
    let mut best: Option<(Move, i8)> = None;
    for mv in board.actions() {
        let Ok(next) = board.apply(mv) else {
            continue;
        };
        let value = minimax_value(&next);
        let improves = match (player, best) {
            (_, None) => true,
            (Mark::X, Some((_, current))) => value > current,
            (Mark::O, Some((_, current))) => value < current,
        };
        if improves {
            best = Some((mv, value));
        }
    }

    if let Some((mv, value)) = best {
        debug!(?player, row = mv.row, col = mv.col, value, "selected move");
    }
    best.map(|(mv, _)| mv)
}
