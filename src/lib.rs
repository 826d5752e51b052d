//! # Reverse-Run Search for Tape Machines
//!
//! Finds an input tape on which a single-tape machine, started in state 0,
//! reaches an accept state. Instead of enumerating inputs, the machine is run
//! backwards from an assumed accepting configuration.
//!
//! ## Core Algorithm
//!
//! 1. **Reverse stepping**: pick a rule entering the current state, move the
//!    head back and constrain the cell it read
//! 2. **Conflict pruning**: a rule whose write disagrees with the tape is skipped
//! 3. **Explicit backtracking**: one resumable candidate frame per depth, exact
//!    tape restore through a depth-tagged undo log
//! 4. **Forward replay**: the discovered run is fired forward and checked
//!
//! The search is bounded by `max_depth` and incomplete: `Failure` and
//! `Overflow` do not prove that no accepting input exists.
//!
//! ## Usage Example
//!
//! ```
//! use revtape::machine::{MachineSpec, Move};
//! use revtape::{replay, solve};
//!
//! let machine = MachineSpec::builder()
//!     .accept_state(1)
//!     .rule(0, 'a', 1, 'b', Move::Right)
//!     .build()?;
//!
//! let outcome = solve(&machine, 16, 16)?;
//! let solution = outcome.solution().expect("one-step machine is solvable");
//! assert_eq!(solution.history, vec![0]);
//! assert!(replay(&machine, solution)?.is_consistent());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod machine; // Rule tables, text format, generators
pub mod replay; // Forward verification of solutions
pub mod search; // Backtracking reverse search
pub mod tape; // Tape window and undo log

/// Python bindings for exposing the solver to external runtimes.
#[cfg(feature = "python-bindings")]
pub mod python_bindings;

// Re-exports for convenience
pub use machine::{MachineError, MachineSpec, Move, Rule, RuleIndex, StateId, Symbol};
pub use replay::{replay, ReplayInconsistency, ReplayReport};
pub use search::{Outcome, SearchReport, SearchStats, Solution, Solver};
pub use tape::{Tape, TapeError};

use thiserror::Error;

/// Configuration parameters for one search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Maximum number of reverse steps before giving up with `Overflow`
    pub max_depth: usize,

    /// Window position of the initial (and final) head
    pub initial_head: usize,

    /// Number of cells in the tape window
    pub tape_len: usize,
}

impl SolverConfig {
    /// Step bound used by the CLI
    pub const DEFAULT_MAX_DEPTH: usize = 1024;

    /// Smallest window that fits `max_depth` steps either way
    pub fn for_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            initial_head: max_depth,
            tape_len: max_depth.saturating_mul(2).saturating_add(1),
        }
    }

    /// Use a different initial head position
    pub fn with_initial_head(mut self, initial_head: usize) -> Self {
        self.initial_head = initial_head;
        self
    }

    /// Use a different window length
    pub fn with_tape_len(mut self, tape_len: usize) -> Self {
        self.tape_len = tape_len;
        self
    }

    /// Check that every head position reachable within `max_depth` steps is
    /// inside the window
    pub fn validate(&self) -> Result<(), SolveError> {
        if self.max_depth == 0 {
            return Err(SolveError::InvalidConfiguration(
                "max_depth must be at least 1".to_string(),
            ));
        }
        let fits = self.initial_head >= self.max_depth
            && self
                .initial_head
                .checked_add(self.max_depth)
                .is_some_and(|right| right < self.tape_len);
        if !fits {
            return Err(SolveError::Capacity {
                max_depth: self.max_depth,
                initial_head: self.initial_head,
                tape_len: self.tape_len,
            });
        }
        Ok(())
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::for_depth(Self::DEFAULT_MAX_DEPTH)
    }
}

/// Errors that can occur while setting up or driving a search
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    /// Configuration rejected before searching
    #[error("Invalid solver configuration: {0}")]
    InvalidConfiguration(String),

    /// Tape window cannot hold `max_depth` steps around the initial head
    #[error(
        "Tape window of {tape_len} cells cannot hold {max_depth} steps either side of position {initial_head}"
    )]
    Capacity {
        /// Step bound
        max_depth: usize,
        /// Initial head position
        initial_head: usize,
        /// Window length
        tape_len: usize,
    },

    /// Tape access failed during the search
    #[error(transparent)]
    Tape(#[from] TapeError),

    /// `step` was called after a terminal outcome
    #[error("Search already finished")]
    SearchFinished,
}

/// Search for an accepting run of at most `max_depth` steps
///
/// The head starts (and, for a solution, ends) at `initial_head_offset`; the
/// window extends `max_depth` cells to its right, so the offset must be at
/// least `max_depth`.
pub fn solve(
    machine: &MachineSpec,
    max_depth: usize,
    initial_head_offset: usize,
) -> Result<Outcome, SolveError> {
    let tape_len = initial_head_offset
        .checked_add(max_depth)
        .and_then(|len| len.checked_add(1))
        .ok_or(SolveError::Capacity {
            max_depth,
            initial_head: initial_head_offset,
            tape_len: usize::MAX,
        })?;
    let config = SolverConfig {
        max_depth,
        initial_head: initial_head_offset,
        tape_len,
    };
    Ok(Solver::new(machine, config)?.run()?.outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_depth_is_tight() {
        let config = SolverConfig::for_depth(100);
        assert_eq!(config.initial_head, 100);
        assert_eq!(config.tape_len, 201);
        assert!(config.validate().is_ok());
        assert!(config.with_tape_len(200).validate().is_err());
    }

    #[test]
    fn test_capacity_errors() {
        let config = SolverConfig::for_depth(10).with_initial_head(9);
        assert_eq!(
            config.validate(),
            Err(SolveError::Capacity {
                max_depth: 10,
                initial_head: 9,
                tape_len: 21,
            })
        );
        assert!(matches!(
            SolverConfig::for_depth(0).validate(),
            Err(SolveError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_default_depth() {
        assert_eq!(SolverConfig::default().max_depth, 1024);
    }

    #[test]
    fn test_solve_rejects_small_offset() {
        let machine = MachineSpec::builder()
            .accept_state(1)
            .rule(0, 'a', 1, 'a', Move::Terminal)
            .build()
            .unwrap();
        assert!(matches!(
            solve(&machine, 8, 3),
            Err(SolveError::Capacity { .. })
        ));
        assert!(matches!(
            solve(&machine, 8, usize::MAX),
            Err(SolveError::Capacity { .. })
        ));
        assert!(solve(&machine, 8, 8).unwrap().is_success());
    }
}
