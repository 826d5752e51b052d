//! Bounded tape window and undo log
//!
//! The conceptual tape is two-way infinite; the search only ever needs a
//! window of `2 * max_depth + 1` cells around the origin because the head
//! moves one cell per step. Cells nobody constrained hold `BLANK`.

mod render;
mod undo;

pub use render::TapeView;
pub use undo::{UndoEntry, UndoLog};

use crate::machine::{StateId, Symbol, BLANK};
use thiserror::Error;

/// Attempted write disagreeing with an already written cell
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cell {position} holds '{found}', cannot write '{attempted}'")]
pub struct Conflict {
    /// Window position of the cell
    pub position: usize,
    /// Symbol already in the cell
    pub found: Symbol,
    /// Symbol that was refused
    pub attempted: Symbol,
}

/// Errors from tape access
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapeError {
    /// Position outside the allocated window
    #[error("position {position} outside tape window of {len} cells")]
    OutOfWindow {
        /// Requested position
        position: usize,
        /// Window length
        len: usize,
    },

    /// Write refused because the cell holds a different symbol
    #[error(transparent)]
    Conflict(#[from] Conflict),
}

/// Effect of a successful [`Tape::write`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Written {
    /// Cell was blank and now holds the symbol
    Filled,
    /// Cell already held this symbol; nothing changed
    Agreed(Symbol),
}

/// Fixed-size window onto the tape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    /// Cell contents, `BLANK` where unconstrained
    cells: Vec<Symbol>,

    /// Window position of the initial head
    origin: usize,
}

impl Tape {
    /// Create an all-blank window of `len` cells
    pub fn blank(len: usize, origin: usize) -> Result<Self, TapeError> {
        if origin >= len {
            return Err(TapeError::OutOfWindow {
                position: origin,
                len,
            });
        }
        Ok(Self {
            cells: vec![BLANK; len],
            origin,
        })
    }

    /// Window length
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the window has no cells (never true for a constructed tape)
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Window position of the initial head
    pub fn origin(&self) -> usize {
        self.origin
    }

    fn check(&self, position: usize) -> Result<usize, TapeError> {
        if position < self.cells.len() {
            Ok(position)
        } else {
            Err(TapeError::OutOfWindow {
                position,
                len: self.cells.len(),
            })
        }
    }

    /// Read symbol at position
    pub fn read(&self, position: usize) -> Result<Symbol, TapeError> {
        self.check(position).map(|idx| self.cells[idx])
    }

    /// Constrain a cell to `symbol`
    ///
    /// Blank cells take the symbol; a cell already holding `symbol` is left
    /// alone; any other symbol is a [`Conflict`] and nothing is mutated.
    pub fn write(&mut self, position: usize, symbol: Symbol) -> Result<Written, TapeError> {
        let idx = self.check(position)?;
        let found = self.cells[idx];
        if found == BLANK {
            self.cells[idx] = symbol;
            Ok(Written::Filled)
        } else if found == symbol {
            Ok(Written::Agreed(found))
        } else {
            Err(Conflict {
                position,
                found,
                attempted: symbol,
            }
            .into())
        }
    }

    /// Overwrite a cell unconditionally
    pub fn set(&mut self, position: usize, symbol: Symbol) -> Result<(), TapeError> {
        let idx = self.check(position)?;
        self.cells[idx] = symbol;
        Ok(())
    }

    /// Reset a cell to `BLANK`
    pub fn erase(&mut self, position: usize) -> Result<(), TapeError> {
        self.set(position, BLANK)
    }

    /// Raw window contents
    pub fn cells(&self) -> &[Symbol] {
        &self.cells
    }

    /// Inclusive bounds of the non-blank region
    pub fn written_span(&self) -> Option<(usize, usize)> {
        let first = self.cells.iter().position(|&c| c != BLANK)?;
        let last = self.cells.iter().rposition(|&c| c != BLANK)?;
        Some((first, last))
    }

    /// Non-blank region as a string (interior blanks kept as `BLANK`)
    pub fn contents(&self) -> String {
        match self.written_span() {
            Some((first, last)) => self.cells[first..=last].iter().collect(),
            None => String::new(),
        }
    }

    /// Number of non-blank cells
    pub fn written_cells(&self) -> usize {
        self.cells.iter().filter(|&&c| c != BLANK).count()
    }

    /// Display adapter marking head, state and origin
    pub fn view(&self, head: usize, state: Option<StateId>) -> TapeView<'_> {
        TapeView::new(self, head, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_blank_then_agree() {
        let mut tape = Tape::blank(5, 2).unwrap();
        assert_eq!(tape.write(2, 'a'), Ok(Written::Filled));
        assert_eq!(tape.write(2, 'a'), Ok(Written::Agreed('a')));
        assert_eq!(tape.read(2), Ok('a'));
    }

    #[test]
    fn test_conflict_leaves_cell_untouched() {
        let mut tape = Tape::blank(5, 2).unwrap();
        tape.set(1, 'a').unwrap();
        let err = tape.write(1, 'b').unwrap_err();
        assert_eq!(
            err,
            TapeError::Conflict(Conflict {
                position: 1,
                found: 'a',
                attempted: 'b',
            })
        );
        assert_eq!(tape.read(1), Ok('a'));
    }

    #[test]
    fn test_out_of_window() {
        let mut tape = Tape::blank(3, 1).unwrap();
        assert_eq!(
            tape.write(3, 'a'),
            Err(TapeError::OutOfWindow { position: 3, len: 3 })
        );
        assert!(Tape::blank(3, 3).is_err());
    }

    #[test]
    fn test_contents_span() {
        let mut tape = Tape::blank(7, 3).unwrap();
        assert_eq!(tape.contents(), "");
        tape.set(1, 'x').unwrap();
        tape.set(4, 'y').unwrap();
        assert_eq!(tape.written_span(), Some((1, 4)));
        assert_eq!(tape.contents(), "x##y");
        assert_eq!(tape.written_cells(), 2);
        tape.erase(1).unwrap();
        assert_eq!(tape.contents(), "y");
    }
}
