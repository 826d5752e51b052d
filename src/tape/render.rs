//! Compact tape rendering: `...[{state}X](Y)...`
//!
//! Only non-blank cells are shown. The head cell is bracketed and prefixed
//! with the current state, the origin cell is parenthesised.

use std::fmt;

use super::Tape;
use crate::machine::{StateId, BLANK};

/// Display adapter returned by [`Tape::view`]
#[derive(Debug, Clone, Copy)]
pub struct TapeView<'a> {
    tape: &'a Tape,
    head: usize,
    state: Option<StateId>,
}

impl<'a> TapeView<'a> {
    pub(super) fn new(tape: &'a Tape, head: usize, state: Option<StateId>) -> Self {
        Self { tape, head, state }
    }
}

impl fmt::Display for TapeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("...")?;
        for (pos, &symbol) in self.tape.cells().iter().enumerate() {
            if symbol == BLANK {
                continue;
            }
            if pos == self.head {
                match self.state {
                    Some(state) => write!(f, "[{{{}}}", state)?,
                    None => f.write_str("[{*}")?,
                }
            }
            if pos == self.tape.origin() {
                f.write_str("(")?;
            }
            write!(f, "{}", symbol)?;
            if pos == self.tape.origin() {
                f.write_str(")")?;
            }
            if pos == self.head {
                f.write_str("]")?;
            }
        }
        f.write_str("...")
    }
}
