use std::collections::{BTreeSet, HashSet};

use itertools::Itertools;
use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::{
    grid::{Cell, Grid},
    sentence::Sentence,
};
use crate::error::{Error, Result};

/// What the player has learned about the board so far.
///
/// Holds the probed cells, the cells proven safe or mined, and the live
/// sentences about every cell that is still unknown. Knowledge only grows:
/// nothing is ever retracted.
///
/// After every public update:
/// - `safes` and `mines` are disjoint,
/// - no sentence mentions a cell in `safes` or `mines`,
/// - no sentence is empty or duplicated,
/// - every probed cell is in `safes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    grid: Grid,
    moves_made: BTreeSet<Cell>,
    safes: BTreeSet<Cell>,
    mines: BTreeSet<Cell>,
    sentences: Vec<Sentence>,
}

impl KnowledgeBase {
    pub fn new(grid: Grid) -> Self {
        KnowledgeBase {
            grid,
            ..Default::default()
        }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn moves_made(&self) -> &BTreeSet<Cell> {
        &self.moves_made
    }

    pub fn safes(&self) -> &BTreeSet<Cell> {
        &self.safes
    }

    pub fn mines(&self) -> &BTreeSet<Cell> {
        &self.mines
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// Records that `cell` was probed safely and that `count` of its
    /// neighbors are mines, then draws every conclusion that follows.
    ///
    /// 1. `cell` joins the probed and safe sets.
    /// 2. A sentence over its still-unknown neighbors is added, with the
    ///    count reduced by the neighbors already known to be mines.
    /// 3. Subset resolution and cleanup run until nothing new is learned.
    ///
    /// Probing a cell twice is harmless. An observation that contradicts
    /// established facts is logged and ignored where it conflicts.
    pub fn add_knowledge(&mut self, cell: Cell, count: usize) -> Result<()> {
        self.grid.check(cell)?;
        let neighbors: Vec<Cell> = self.grid.neighbors(cell).collect();
        if count > neighbors.len() {
            return Err(Error::CountExceedsNeighbors {
                row: cell.row,
                col: cell.col,
                count,
                neighbors: neighbors.len(),
            });
        }
        if self.mines.contains(&cell) {
            warn!(%cell, "probed cell is a known mine, ignoring observation");
            return Ok(());
        }

        debug!(%cell, count, "adding knowledge");
        self.moves_made.insert(cell);
        self.assert_safe(cell);

        let mut unknown = BTreeSet::new();
        let mut known_mines = 0;
        for neighbor in neighbors {
            if self.mines.contains(&neighbor) {
                known_mines += 1;
            } else if !self.safes.contains(&neighbor) {
                unknown.insert(neighbor);
            }
        }

        match count.checked_sub(known_mines) {
            Some(remaining) => self.sentences.push(Sentence::new(unknown, remaining)),
            None => warn!(
                %cell,
                count,
                known_mines,
                "more known mines than reported, ignoring observation"
            ),
        }

        self.infer();
        Ok(())
    }

    /// Records a cell known to be a mine from outside normal probing.
    pub fn mark_mine(&mut self, cell: Cell) -> Result<()> {
        self.grid.check(cell)?;
        if self.assert_mine(cell) {
            self.infer();
        }
        Ok(())
    }

    /// Records a cell known to be safe from outside normal probing.
    pub fn mark_safe(&mut self, cell: Cell) -> Result<()> {
        self.grid.check(cell)?;
        if self.assert_safe(cell) {
            self.infer();
        }
        Ok(())
    }

    /// A cell proven safe that has not been probed yet.
    pub fn suggest_safe_move(&self) -> Option<Cell> {
        self.safes
            .iter()
            .find(|&&cell| !self.moves_made.contains(&cell) && !self.mines.contains(&cell))
            .copied()
    }

    /// A uniformly random cell that is neither probed nor a known mine.
    pub fn suggest_random_move(&self) -> Option<Cell> {
        self.suggest_random_move_with(&mut rand::rng())
    }

    /// Like [`suggest_random_move`](Self::suggest_random_move), drawing from `rng`.
    pub fn suggest_random_move_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Cell> {
        let candidates: Vec<Cell> = self
            .grid
            .cells()
            .filter(|cell| !self.moves_made.contains(cell) && !self.mines.contains(cell))
            .collect();
        candidates.choose(rng).copied()
    }

    /// Adds `cell` to the mines and removes it from every sentence.
    /// Returns false if it was already known either way.
    fn assert_mine(&mut self, cell: Cell) -> bool {
        if self.safes.contains(&cell) {
            warn!(%cell, "cell is known to be safe, not marking it as a mine");
            return false;
        }
        if !self.mines.insert(cell) {
            return false;
        }
        debug!(%cell, "marked mine");
        for sentence in &mut self.sentences {
            sentence.mark_mine(cell);
        }
        true
    }

    /// Adds `cell` to the safes and removes it from every sentence.
    /// Returns false if it was already known either way.
    fn assert_safe(&mut self, cell: Cell) -> bool {
        if self.mines.contains(&cell) {
            warn!(%cell, "cell is known to be a mine, not marking it as safe");
            return false;
        }
        if !self.safes.insert(cell) {
            return false;
        }
        debug!(%cell, "marked safe");
        for sentence in &mut self.sentences {
            sentence.mark_safe(cell);
        }
        true
    }

    /// Rewrites `sentence` in terms of the cells that are still unknown.
    fn prune(&self, mut sentence: Sentence) -> Sentence {
        let known: Vec<Cell> = sentence
            .cells()
            .iter()
            .filter(|&&cell| self.mines.contains(&cell) || self.safes.contains(&cell))
            .copied()
            .collect();
        for cell in known {
            if self.mines.contains(&cell) {
                sentence.mark_mine(cell);
            } else {
                sentence.mark_safe(cell);
            }
        }
        sentence
    }

    /// Alternates cleanup and subset resolution until a fixed point.
    fn infer(&mut self) {
        let mut derived = HashSet::new();
        loop {
            self.settle();
            if !self.resolve_subsets(&mut derived) {
                break;
            }
        }
    }

    /// One resolution pass over every pair of live sentences.
    ///
    /// `derived` remembers what this update already produced so that a
    /// sentence discarded by cleanup is not counted as new twice. Returns
    /// whether anything new was added.
    fn resolve_subsets(&mut self, derived: &mut HashSet<Sentence>) -> bool {
        let snapshot = self.sentences.clone();
        let mut learned = false;

        for (a, b) in snapshot.iter().tuple_combinations() {
            let Some(sentence) = a.resolve(b) else {
                continue;
            };
            let sentence = self.prune(sentence);
            if sentence.is_empty() || self.sentences.contains(&sentence) {
                continue;
            }
            if sentence.is_contradiction() {
                warn!(%sentence, "resolution produced a contradiction, skipping");
                continue;
            }
            if !derived.insert(sentence.clone()) {
                continue;
            }

            trace!(%a, %b, %sentence, "derived sentence");
            learned = true;

            let safes = sentence.known_safes().cloned();
            let mines = sentence.known_mines().cloned();
            self.sentences.push(sentence);
            for cell in safes.into_iter().flatten() {
                self.assert_safe(cell);
            }
            for cell in mines.into_iter().flatten() {
                self.assert_mine(cell);
            }
        }

        learned
    }

    /// Drops duplicate and empty sentences, then marks and discards every
    /// sentence whose cells are all safe or all mines, repeating while that
    /// keeps teaching something.
    fn settle(&mut self) {
        loop {
            self.sentences = std::mem::take(&mut self.sentences)
                .into_iter()
                .unique()
                .filter(|sentence| {
                    if sentence.is_contradiction() {
                        warn!(%sentence, "dropping contradictory sentence");
                        return false;
                    }
                    !sentence.is_empty()
                })
                .collect();

            let mut safes = BTreeSet::new();
            let mut mines = BTreeSet::new();
            for sentence in &self.sentences {
                if let Some(cells) = sentence.known_safes() {
                    safes.extend(cells.iter().copied());
                } else if let Some(cells) = sentence.known_mines() {
                    mines.extend(cells.iter().copied());
                }
            }
            if safes.is_empty() && mines.is_empty() {
                break;
            }

            for cell in safes {
                self.assert_safe(cell);
            }
            for cell in mines {
                self.assert_mine(cell);
            }
        }
    }
}
