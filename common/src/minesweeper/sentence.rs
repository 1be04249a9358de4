use std::{collections::BTreeSet, fmt};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::grid::Cell;

/// A logical statement about the board: exactly `count` of `cells` are mines.
///
/// Equality is value equality over the cell set and the count.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sentence {
    cells: BTreeSet<Cell>,
    count: usize,
}

impl Sentence {
    pub fn new(cells: impl IntoIterator<Item = Cell>, count: usize) -> Self {
        Sentence {
            cells: cells.into_iter().collect(),
            count,
        }
    }

    pub fn cells(&self) -> &BTreeSet<Cell> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// All cells, if the sentence says every one of them is a mine.
    pub fn known_mines(&self) -> Option<&BTreeSet<Cell>> {
        (self.count != 0 && self.count == self.cells.len()).then_some(&self.cells)
    }

    /// All cells, if the sentence says none of them is a mine.
    pub fn known_safes(&self) -> Option<&BTreeSet<Cell>> {
        (self.count == 0).then_some(&self.cells)
    }

    /// True if the count cannot be satisfied by the cells, e.g. an empty
    /// sentence that still claims a mine.
    pub fn is_contradiction(&self) -> bool {
        self.count > self.cells.len()
    }

    /// Removes a cell known to be a mine. Returns whether the cell was present.
    pub fn mark_mine(&mut self, cell: Cell) -> bool {
        if !self.cells.remove(&cell) {
            return false;
        }
        self.count = self.count.saturating_sub(1);
        true
    }

    /// Removes a cell known to be safe. Returns whether the cell was present.
    pub fn mark_safe(&mut self, cell: Cell) -> bool {
        self.cells.remove(&cell)
    }

    /// Subset resolution.
    ///
    /// When one sentence's cells are a proper subset of the other's, the
    /// cells only in the larger sentence hold exactly the difference of the
    /// two counts. Returns `None` for identical or unrelated cell sets, and
    /// when the counts are inconsistent with the subset relation.
    pub fn resolve(&self, other: &Sentence) -> Option<Sentence> {
        if self.cells == other.cells {
            return None;
        }
        let (subset, superset) = if self.cells.is_subset(&other.cells) {
            (self, other)
        } else if other.cells.is_subset(&self.cells) {
            (other, self)
        } else {
            return None;
        };

        let count = superset.count.checked_sub(subset.count)?;
        let cells: BTreeSet<Cell> = superset.cells.difference(&subset.cells).copied().collect();
        (count <= cells.len()).then_some(Sentence { cells, count })
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}} = {}", self.cells.iter().join(", "), self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(coords: &[(usize, usize)]) -> Vec<Cell> {
        coords.iter().map(|&(r, c)| Cell::new(r, c)).collect()
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = Sentence::new(cells(&[(0, 0), (0, 1), (1, 0)]), 1);
        let b = Sentence::new(cells(&[(1, 0), (0, 0), (0, 1)]), 1);
        let c = Sentence::new(cells(&[(1, 0), (0, 0), (0, 1)]), 2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_known_cells() {
        let all_mines = Sentence::new(cells(&[(0, 0), (0, 1)]), 2);
        assert_eq!(all_mines.known_mines().map(|c| c.len()), Some(2));
        assert_eq!(all_mines.known_safes(), None);

        let all_safe = Sentence::new(cells(&[(0, 0), (0, 1)]), 0);
        assert_eq!(all_safe.known_safes().map(|c| c.len()), Some(2));
        assert_eq!(all_safe.known_mines(), None);

        let unknown = Sentence::new(cells(&[(0, 0), (0, 1)]), 1);
        assert_eq!(unknown.known_mines(), None);
        assert_eq!(unknown.known_safes(), None);

        let vacuous = Sentence::new([], 0);
        assert!(vacuous.is_empty());
        assert_eq!(vacuous.known_mines(), None);
        assert!(!vacuous.is_contradiction());
        assert!(Sentence::new([], 1).is_contradiction());
    }

    #[test]
    fn test_marking_cells() {
        let mut s = Sentence::new(cells(&[(0, 0), (0, 1), (1, 1)]), 2);

        assert!(s.mark_mine(Cell::new(0, 0)));
        assert_eq!(s.count(), 1);
        assert_eq!(s.len(), 2);

        assert!(s.mark_safe(Cell::new(0, 1)));
        assert_eq!(s.count(), 1);
        assert_eq!(s.len(), 1);

        // Cells outside the sentence leave it unchanged.
        assert!(!s.mark_mine(Cell::new(5, 5)));
        assert!(!s.mark_safe(Cell::new(5, 5)));
        assert_eq!(s, Sentence::new(cells(&[(1, 1)]), 1));
    }

    #[test]
    fn test_resolve_subset() {
        let big = Sentence::new(cells(&[(0, 0), (0, 1), (0, 2)]), 2);
        let small = Sentence::new(cells(&[(0, 0), (0, 1)]), 1);

        let expected = Sentence::new(cells(&[(0, 2)]), 1);
        assert_eq!(big.resolve(&small), Some(expected.clone()));
        assert_eq!(small.resolve(&big), Some(expected));
    }

    #[test]
    fn test_resolve_unrelated_or_identical() {
        let a = Sentence::new(cells(&[(0, 0), (0, 1)]), 1);
        let b = Sentence::new(cells(&[(0, 1), (0, 2)]), 1);
        let a_again = Sentence::new(cells(&[(0, 0), (0, 1)]), 1);
        assert_eq!(a.resolve(&b), None);
        assert_eq!(a.resolve(&a_again), None);
    }

    #[test]
    fn test_resolve_rejects_inconsistent_counts() {
        let big = Sentence::new(cells(&[(0, 0), (0, 1)]), 0);
        let small = Sentence::new(cells(&[(0, 0)]), 1);
        assert_eq!(big.resolve(&small), None);
    }

    #[test]
    fn test_display() {
        let s = Sentence::new(cells(&[(1, 0), (0, 2)]), 1);
        assert_eq!(s.to_string(), "{(0, 2), (1, 0)} = 1");
    }
}
