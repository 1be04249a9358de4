//! Two small game AIs.
//!
//! - [`tictactoe`]: exhaustive minimax that always finds the optimal move.
//! - [`minesweeper`]: a propositional knowledge base that deduces safe and
//!   mine cells from probe results by subset resolution.
//!
//! Both are synchronous and hold no global state. Rendering, mine placement
//! and game loops belong to the caller.

pub mod error;
pub mod minesweeper;
pub mod tictactoe;

pub use error::{Error, Result};
