//! Trace events emitted by the search
//!
//! The engine never prints; it reports to a [`SearchObserver`]. `()` discards
//! events, `Vec<SearchEvent>` records them and [`TracingObserver`] forwards
//! them to `tracing`.

use tracing::{debug, info, trace};

use crate::machine::{RuleIndex, StateId};
use crate::tape::Conflict;

/// One observable decision of the search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// A candidate rule was pulled from the frame at `depth`
    Candidate {
        /// Depth of the frame
        depth: usize,
        /// Rule offered
        rule: RuleIndex,
    },

    /// The candidate's write disagreed with the tape; no step consumed
    Conflict {
        /// Depth of the frame
        depth: usize,
        /// Rule refused
        rule: RuleIndex,
        /// The refused write
        conflict: Conflict,
    },

    /// The candidate was applied in reverse
    Applied {
        /// Depth the rule was applied at
        depth: usize,
        /// Rule applied
        rule: RuleIndex,
        /// Head position after the reverse step
        head: usize,
        /// State before the rule fires forward
        state: StateId,
    },

    /// The frame at `depth + 1` was exhausted and the step at `depth` undone
    Rollback {
        /// Depth of the undone step
        depth: usize,
        /// Rule undone
        rule: RuleIndex,
        /// Overwritten cells restored from the undo log
        restored: usize,
    },

    /// The start state was reached
    Solved {
        /// Length of the discovered run
        steps: usize,
    },

    /// The depth-0 frame ran out of candidates
    Exhausted,

    /// The step bound was hit
    Overflow {
        /// Depth reached
        depth: usize,
    },
}

/// Sink for search trace events
pub trait SearchObserver {
    /// Called for every event, in order
    fn on_event(&mut self, event: &SearchEvent);
}

impl SearchObserver for () {
    fn on_event(&mut self, _event: &SearchEvent) {}
}

impl SearchObserver for Vec<SearchEvent> {
    fn on_event(&mut self, event: &SearchEvent) {
        self.push(event.clone());
    }
}

/// Forwards events to the `tracing` subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SearchObserver for TracingObserver {
    fn on_event(&mut self, event: &SearchEvent) {
        match *event {
            SearchEvent::Candidate { depth, rule } => trace!(depth, rule, "candidate"),
            SearchEvent::Conflict {
                depth,
                rule,
                conflict,
            } => trace!(
                depth,
                rule,
                position = conflict.position,
                found = %conflict.found,
                attempted = %conflict.attempted,
                "output conflict"
            ),
            SearchEvent::Applied {
                depth,
                rule,
                head,
                state,
            } => trace!(depth, rule, head, state, "applied"),
            SearchEvent::Rollback {
                depth,
                rule,
                restored,
            } => debug!(depth, rule, restored, "rollback"),
            SearchEvent::Solved { steps } => info!(steps, "resolved"),
            SearchEvent::Exhausted => info!("no answer: depth 0 exhausted"),
            SearchEvent::Overflow { depth } => info!(depth, "step overflow"),
        }
    }
}
