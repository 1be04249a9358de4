//! Minesweeper inference.
//!
//! A [`KnowledgeBase`] turns probe results into [`Sentence`]s ("exactly N of
//! these cells are mines") and resolves them against each other until no
//! new safe or mine cell can be deduced. A [`Minefield`] is the hidden board
//! that answers the probes.

mod grid;
mod knowledge;
mod minefield;
mod sentence;

pub use grid::{Cell, Grid};
pub use knowledge::KnowledgeBase;
pub use minefield::Minefield;
pub use sentence::Sentence;
