//! Backtracking reverse search
//!
//! Simulates the machine backwards from an accepting state, looking for a
//! tape on which a forward run from `START_STATE` accepts:
//! - one lazily advanced [`SearchFrame`] per depth
//! - one shared [`Tape`] restored exactly on backtrack
//! - three outcomes: success, exhaustion, depth overflow
//!
//! Failure is not a proof that no accepting input exists; the search is
//! bounded by `max_depth`.

mod engine;
pub mod events;
mod frame;

pub use engine::{Search, SearchState, Solver, Step};
pub use events::{SearchEvent, SearchObserver, TracingObserver};
pub use frame::{FrameMode, SearchFrame};

use crate::machine::{MachineSpec, Rule, RuleIndex};
use crate::tape::Tape;

/// Accepting run found by the search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// Applied rules in search order: the last rule to fire forward comes first
    pub history: Vec<RuleIndex>,

    /// Tape at the end of the search, i.e. the forward run's input
    pub tape: Tape,

    /// Head position where the forward run starts
    pub head: usize,
}

impl Solution {
    /// Length of the forward run
    pub fn steps(&self) -> usize {
        self.history.len()
    }

    /// Window position the forward run must end on
    pub fn origin(&self) -> usize {
        self.tape.origin()
    }

    /// Non-blank input region
    pub fn input(&self) -> String {
        self.tape.contents()
    }

    /// Rules in forward firing order
    pub fn forward_rules<'m>(
        &'m self,
        machine: &'m MachineSpec,
    ) -> impl Iterator<Item = (RuleIndex, &'m Rule)> + 'm {
        self.history
            .iter()
            .rev()
            .filter_map(move |&index| machine.rule(index).map(|rule| (index, rule)))
    }
}

/// Terminal outcome of a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The start state was reached
    Success(Solution),

    /// Every candidate at depth 0 was exhausted
    Failure,

    /// The step bound was reached first
    Overflow,
}

impl Outcome {
    /// Whether a solution was found
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// The solution, if any
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Outcome::Success(solution) => Some(solution),
            _ => None,
        }
    }

    /// Consume into the solution, if any
    pub fn into_solution(self) -> Option<Solution> {
        match self {
            Outcome::Success(solution) => Some(solution),
            _ => None,
        }
    }

    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::Failure => "failure",
            Outcome::Overflow => "overflow",
        }
    }
}

/// Counters collected during one search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct SearchStats {
    /// Candidates pulled from frames
    pub candidates: usize,
    /// Candidates refused by a write conflict
    pub conflicts: usize,
    /// Reverse steps applied
    pub applied: usize,
    /// Steps undone
    pub rollbacks: usize,
    /// Deepest history length seen
    pub max_depth_reached: usize,
}

/// Outcome plus counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    /// Terminal outcome
    pub outcome: Outcome,
    /// Search counters
    pub stats: SearchStats,
}
