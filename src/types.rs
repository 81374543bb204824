//! Small value types shared by the structural model, the domain store, and the search.

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// An identifier for a variable (slot) in a `GridConfig`, which is an index into its
/// `variables` vec.
pub type VariableId = usize;

/// An identifier for a word in a `WordList`, which is an index into its `words` vec.
pub type WordId = usize;

/// An ordered pair of variables, read as "`x` must remain consistent with `y`".
pub type DirectedArc = (VariableId, VariableId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    Across,
    Down,
}

impl Direction {
    /// The `(row, col)` step taken from one cell of a slot to the next.
    #[must_use]
    pub fn step(self) -> (usize, usize) {
        match self {
            Direction::Across => (0, 1),
            Direction::Down => (1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Across => write!(f, "across"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A single word slot in the grid. Two variables are equal iff all four attributes match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Variable {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

impl Variable {
    #[must_use]
    pub fn new(row: usize, col: usize, direction: Direction, length: usize) -> Variable {
        Variable {
            row,
            col,
            direction,
            length,
        }
    }

    /// The `(row, col)` coordinates of each cell covered by this variable, in word order.
    pub fn cells(self) -> impl Iterator<Item = (usize, usize)> {
        let (row_step, col_step) = self.direction.step();
        (0..self.length).map(move |idx| (self.row + idx * row_step, self.col + idx * col_step))
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) {} : {}",
            self.row, self.col, self.direction, self.length
        )
    }
}

/// The shared cell between two variables: character `index` of the first variable's word must
/// equal character `other_index` of the second variable's word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Overlap {
    pub index: usize,
    pub other_index: usize,
}

impl Overlap {
    /// The same overlap, seen from the other variable's side.
    #[must_use]
    pub fn flipped(self) -> Overlap {
        Overlap {
            index: self.other_index,
            other_index: self.index,
        }
    }
}
