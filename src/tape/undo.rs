//! Undo log for overwritten cells
//!
//! Only cells that already held a symbol when a step touched them are
//! logged. Blank cells are restored by the caller erasing the step's cell.

use super::{Tape, TapeError};
use crate::machine::Symbol;

/// Prior value of one overwritten cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoEntry {
    /// Search depth of the step that overwrote the cell
    pub depth: usize,
    /// Window position of the cell
    pub position: usize,
    /// Symbol the cell held before the overwrite
    pub prior: Symbol,
}

/// Stack of undo entries, deepest step on top
#[derive(Debug, Clone, Default)]
pub struct UndoLog {
    entries: Vec<UndoEntry>,
}

impl UndoLog {
    /// Create empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the prior value of a cell about to be overwritten at `depth`
    pub fn push_undo(&mut self, depth: usize, position: usize, prior: Symbol) {
        debug_assert!(
            self.entries.last().map_or(true, |top| top.depth <= depth),
            "undo entries must be pushed in depth order"
        );
        self.entries.push(UndoEntry {
            depth,
            position,
            prior,
        });
    }

    /// Pop every entry logged at `depth` or deeper, restoring its cell
    ///
    /// Returns the number of cells restored.
    pub fn rollback_to(&mut self, depth: usize, tape: &mut Tape) -> Result<usize, TapeError> {
        let mut restored = 0;
        while let Some(top) = self.entries.last().copied() {
            if top.depth < depth {
                break;
            }
            tape.set(top.position, top.prior)?;
            self.entries.pop();
            restored += 1;
        }
        Ok(restored)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Live entries, oldest first
    pub fn entries(&self) -> &[UndoEntry] {
        &self.entries
    }
}
