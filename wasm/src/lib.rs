use anyhow::Context;
use gameai::{
    minesweeper::{Cell, Grid, KnowledgeBase},
    tictactoe::{self, Board, Mark, Move},
};
use serde::{Serialize, de::DeserializeOwned};
use wasm_bindgen::prelude::*;

fn decode<T: DeserializeOwned>(bts: &[u8]) -> anyhow::Result<T> {
    bcs::from_bytes(bts).context("malformed state bytes")
}

fn encode<T: Serialize>(value: &T) -> anyhow::Result<Vec<u8>> {
    bcs::to_bytes(value).context("failed to encode state")
}

fn to_host<T>(result: anyhow::Result<T>) -> Result<T, String> {
    result.map_err(|e| format!("{e:#}"))
}

fn mark_code(mark: Option<Mark>) -> i8 {
    match mark {
        Some(Mark::X) => 1,
        Some(Mark::O) => -1,
        None => 0,
    }
}

// --- Tic-tac-toe ---

fn best_move_of(bts: &[u8]) -> anyhow::Result<Vec<u32>> {
    let board: Board = decode(bts)?;
    Ok(tictactoe::best_move(&board)
        .map(|mv| vec![mv.row as u32, mv.col as u32])
        .unwrap_or_default())
}

fn apply_move_to(bts: &[u8], row: usize, col: usize) -> anyhow::Result<Vec<u8>> {
    let board: Board = decode(bts)?;
    let next = board
        .apply(Move::new(row, col))
        .with_context(|| format!("cannot play ({row}, {col})"))?;
    encode(&next)
}

#[wasm_bindgen]
pub fn new_board() -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    to_host(encode(&Board::new()))
}

/// `[row, col]` of the optimal move, or an empty vector on a finished game.
#[wasm_bindgen]
pub fn board_best_move(bts: Vec<u8>) -> Result<Vec<u32>, String> {
    console_error_panic_hook::set_once();

    to_host(best_move_of(&bts))
}

#[wasm_bindgen]
pub fn board_apply_move(bts: Vec<u8>, row: usize, col: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    to_host(apply_move_to(&bts, row, col))
}

/// `[terminal, winner]`: terminal is 0 or 1, winner is 1 for X, -1 for O
/// and 0 for none.
#[wasm_bindgen]
pub fn board_status(bts: Vec<u8>) -> Result<Vec<i8>, String> {
    console_error_panic_hook::set_once();

    to_host(decode::<Board>(&bts).map(|board| {
        vec![board.is_terminal() as i8, mark_code(board.winner())]
    }))
}

/// Row-major squares: 1 for X, -1 for O, 0 for empty.
#[wasm_bindgen]
pub fn board_cells(bts: Vec<u8>) -> Result<Vec<i8>, String> {
    console_error_panic_hook::set_once();

    to_host(decode::<Board>(&bts).map(|board| {
        board
            .rows()
            .iter()
            .flatten()
            .map(|&square| mark_code(square))
            .collect()
    }))
}

// --- Minesweeper ---

#[wasm_bindgen]
pub fn new_knowledge_base(height: usize, width: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    to_host(encode(&KnowledgeBase::new(Grid::new(height, width))))
}

fn update_knowledge(
    bts: &[u8],
    update: impl FnOnce(&mut KnowledgeBase) -> gameai::Result<()>,
) -> anyhow::Result<Vec<u8>> {
    let mut kb: KnowledgeBase = decode(bts)?;
    update(&mut kb).context("knowledge base rejected the update")?;
    encode(&kb)
}

#[wasm_bindgen]
pub fn knowledge_add(bts: Vec<u8>, row: usize, col: usize, count: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    to_host(update_knowledge(&bts, |kb| {
        kb.add_knowledge(Cell::new(row, col), count)
    }))
}

#[wasm_bindgen]
pub fn knowledge_mark_mine(bts: Vec<u8>, row: usize, col: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    to_host(update_knowledge(&bts, |kb| kb.mark_mine(Cell::new(row, col))))
}

#[wasm_bindgen]
pub fn knowledge_mark_safe(bts: Vec<u8>, row: usize, col: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    to_host(update_knowledge(&bts, |kb| kb.mark_safe(Cell::new(row, col))))
}

fn cell_coords(cell: Option<Cell>) -> Vec<u32> {
    cell.map(|c| vec![c.row as u32, c.col as u32])
        .unwrap_or_default()
}

/// `[row, col]` of a proven-safe unprobed cell, or an empty vector.
#[wasm_bindgen]
pub fn knowledge_safe_move(bts: Vec<u8>) -> Result<Vec<u32>, String> {
    console_error_panic_hook::set_once();

    to_host(decode::<KnowledgeBase>(&bts).map(|kb| cell_coords(kb.suggest_safe_move())))
}

/// `[row, col]` of a random unprobed cell not known to be a mine, or an
/// empty vector.
#[wasm_bindgen]
pub fn knowledge_random_move(bts: Vec<u8>) -> Result<Vec<u32>, String> {
    console_error_panic_hook::set_once();

    to_host(decode::<KnowledgeBase>(&bts).map(|kb| cell_coords(kb.suggest_random_move())))
}

/// Row-major cell states: -1 known mine, 0 unknown, 1 known safe, 2 probed.
#[wasm_bindgen]
pub fn knowledge_cells(bts: Vec<u8>) -> Result<Vec<i8>, String> {
    console_error_panic_hook::set_once();

    to_host(decode::<KnowledgeBase>(&bts).map(|kb| {
        kb.grid()
            .cells()
            .map(|cell| {
                if kb.mines().contains(&cell) {
                    -1
                } else if kb.moves_made().contains(&cell) {
                    2
                } else if kb.safes().contains(&cell) {
                    1
                } else {
                    0
                }
            })
            .collect()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_play_through_host() {
        let bts = new_board().unwrap();
        assert_eq!(board_status(bts.clone()).unwrap(), vec![0, 0]);

        let bts = board_apply_move(bts, 1, 1).unwrap();
        assert_eq!(
            board_cells(bts.clone()).unwrap(),
            vec![0, 0, 0, 0, 1, 0, 0, 0, 0]
        );

        let reply = board_best_move(bts.clone()).unwrap();
        assert_eq!(reply.len(), 2);
        let bts = board_apply_move(bts, reply[0] as usize, reply[1] as usize).unwrap();
        assert_eq!(board_cells(bts).unwrap().iter().filter(|&&c| c == -1).count(), 1);
    }

    #[test]
    fn test_board_errors_reach_host() {
        let bts = board_apply_move(new_board().unwrap(), 0, 0).unwrap();

        let err = board_apply_move(bts, 0, 0).unwrap_err();
        assert!(err.contains("already occupied"), "{err}");

        let err = board_apply_move(new_board().unwrap(), 3, 3).unwrap_err();
        assert!(err.contains("out of bounds"), "{err}");

        assert!(board_status(vec![7]).is_err());
    }

    #[test]
    fn test_finished_board_has_no_move() {
        let board: Board = "XXX/OO./...".parse().unwrap();
        let bts = encode(&board).unwrap();
        assert_eq!(board_status(bts.clone()).unwrap(), vec![1, 1]);
        assert!(board_best_move(bts).unwrap().is_empty());
    }

    #[test]
    fn test_knowledge_through_host() {
        let bts = new_knowledge_base(3, 3).unwrap();
        let bts = knowledge_add(bts, 1, 1, 0).unwrap();

        assert_eq!(
            knowledge_cells(bts.clone()).unwrap(),
            vec![1, 1, 1, 1, 2, 1, 1, 1, 1]
        );
        assert_eq!(knowledge_safe_move(bts.clone()).unwrap(), vec![0, 0]);
        assert_eq!(knowledge_random_move(bts).unwrap().len(), 2);
    }

    #[test]
    fn test_knowledge_marks_through_host() {
        let bts = new_knowledge_base(1, 2).unwrap();
        let bts = knowledge_mark_mine(bts, 0, 1).unwrap();
        let bts = knowledge_mark_safe(bts, 0, 0).unwrap();
        assert_eq!(knowledge_cells(bts.clone()).unwrap(), vec![1, -1]);

        let bts = knowledge_add(bts, 0, 0, 1).unwrap();
        assert!(knowledge_safe_move(bts.clone()).unwrap().is_empty());
        assert!(knowledge_random_move(bts.clone()).unwrap().is_empty());

        let err = knowledge_add(bts, 0, 5, 0).unwrap_err();
        assert!(err.contains("outside the 1x2 grid"), "{err}");
    }
}
