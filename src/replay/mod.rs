//! Forward replay of a discovered run
//!
//! Runs the solution's rules forward from its reconstructed input and checks
//! that every rule reads what the search assumed it reads. Inconsistencies are
//! collected, never raised: they point at a malformed machine or an engine
//! defect and do not invalidate the solution.

use thiserror::Error;

use crate::machine::{MachineSpec, RuleIndex, StateId, Symbol, START_STATE};
use crate::search::Solution;
use crate::tape::{Tape, TapeError};

/// Disagreement between the replayed run and the rule table
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayInconsistency {
    /// The cell under the head does not hold the rule's input symbol
    #[error("step {step}: rule #{rule} expects '{expected}' at {position}, tape holds '{found}'")]
    IncorrectInputSymbol {
        /// Forward step, starting at 0
        step: usize,
        /// Rule fired
        rule: RuleIndex,
        /// Head position
        position: usize,
        /// Rule's input symbol
        expected: Symbol,
        /// Symbol on the tape
        found: Symbol,
    },

    /// The rule does not start in the replayed state
    #[error("step {step}: rule #{rule} starts in {{{expected}}}, replay is in {{{found}}}")]
    StateMismatch {
        /// Forward step, starting at 0
        step: usize,
        /// Rule fired
        rule: RuleIndex,
        /// Rule's before state
        expected: StateId,
        /// Replayed state
        found: StateId,
    },

    /// The run did not end on the initial head position
    #[error("run ends at {found}, expected {expected}")]
    IncorrectEndHead {
        /// Initial head position
        expected: usize,
        /// Final head position
        found: usize,
    },

    /// The run ended outside the accept set
    #[error("run ends in non-accepting state {{{state}}}")]
    NotAccepting {
        /// Final state
        state: StateId,
    },
}

impl ReplayInconsistency {
    /// Short marker for trace output
    pub fn marker(&self) -> &'static str {
        match self {
            ReplayInconsistency::IncorrectInputSymbol { .. } => "incorrect input symbol",
            ReplayInconsistency::StateMismatch { .. } => "state mismatch",
            ReplayInconsistency::IncorrectEndHead { .. } => "incorrect end head",
            ReplayInconsistency::NotAccepting { .. } => "not accepting",
        }
    }
}

/// Errors that stop a replay
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayError {
    /// History refers to a rule the machine does not have
    #[error("history refers to unknown rule #{0}")]
    UnknownRule(RuleIndex),

    /// Head left the tape window
    #[error(transparent)]
    Tape(#[from] TapeError),
}

/// One forward step of the replay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayStep {
    /// Forward step, starting at 0
    pub step: usize,
    /// Rule fired
    pub rule: RuleIndex,
    /// Head position after the step
    pub head: usize,
    /// State after the step
    pub state: StateId,
    /// Inconsistencies found while firing this rule
    pub anomalies: Vec<ReplayInconsistency>,
}

/// Step-wise forward replay over a copy of the solution tape
#[derive(Debug, Clone)]
pub struct ForwardReplay<'a> {
    machine: &'a MachineSpec,
    /// Remaining rules, forward order is from the back
    pending: &'a [RuleIndex],
    tape: Tape,
    head: usize,
    state: StateId,
    step: usize,
    steps: Vec<ReplayStep>,
}

impl<'a> ForwardReplay<'a> {
    /// Prepare a replay starting in `START_STATE` at the solution head
    pub fn new(machine: &'a MachineSpec, solution: &'a Solution) -> Self {
        Self {
            machine,
            pending: &solution.history,
            tape: solution.tape.clone(),
            head: solution.head,
            state: START_STATE,
            step: 0,
            steps: Vec::with_capacity(solution.history.len()),
        }
    }

    /// Tape as the replay left it
    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Current head position
    pub fn head(&self) -> usize {
        self.head
    }

    /// Current state
    pub fn state(&self) -> StateId {
        self.state
    }

    /// Fire the next rule; `None` once the history is used up
    pub fn next_step(&mut self) -> Result<Option<&ReplayStep>, ReplayError> {
        let Some((&index, rest)) = self.pending.split_last() else {
            return Ok(None);
        };
        let rule = *self
            .machine
            .rule(index)
            .ok_or(ReplayError::UnknownRule(index))?;

        let mut anomalies = Vec::new();
        if rule.before_state != self.state {
            anomalies.push(ReplayInconsistency::StateMismatch {
                step: self.step,
                rule: index,
                expected: rule.before_state,
                found: self.state,
            });
        }
        let found = self.tape.read(self.head)?;
        if found != rule.input_symbol {
            anomalies.push(ReplayInconsistency::IncorrectInputSymbol {
                step: self.step,
                rule: index,
                position: self.head,
                expected: rule.input_symbol,
                found,
            });
        }

        self.tape.set(self.head, rule.output_symbol)?;
        self.head = rule.movement.apply(self.head).ok_or(TapeError::OutOfWindow {
            position: self.head,
            len: self.tape.len(),
        })?;
        self.state = rule.after_state;
        self.pending = rest;

        self.steps.push(ReplayStep {
            step: self.step,
            rule: index,
            head: self.head,
            state: self.state,
            anomalies,
        });
        self.step += 1;
        Ok(self.steps.last())
    }

    /// Fire every remaining rule and check where the run ended
    pub fn finish(mut self) -> Result<ReplayReport, ReplayError> {
        while self.next_step()?.is_some() {}

        let mut anomalies: Vec<ReplayInconsistency> = self
            .steps
            .iter()
            .flat_map(|step| step.anomalies.iter().copied())
            .collect();
        if self.head != self.tape.origin() {
            anomalies.push(ReplayInconsistency::IncorrectEndHead {
                expected: self.tape.origin(),
                found: self.head,
            });
        }
        if !self.machine.is_accept(self.state) {
            anomalies.push(ReplayInconsistency::NotAccepting { state: self.state });
        }

        Ok(ReplayReport {
            anomalies,
            steps: self.steps,
            final_tape: self.tape,
            final_head: self.head,
            final_state: self.state,
        })
    }
}

/// Full result of a forward replay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    /// Every inconsistency, in the order found
    pub anomalies: Vec<ReplayInconsistency>,
    /// Per-step trace
    pub steps: Vec<ReplayStep>,
    /// Tape after the last rule
    pub final_tape: Tape,
    /// Head after the last rule
    pub final_head: usize,
    /// State after the last rule
    pub final_state: StateId,
}

impl ReplayReport {
    /// No inconsistency was found
    pub fn is_consistent(&self) -> bool {
        self.anomalies.is_empty()
    }
}

/// Replay `solution` forward against `machine`
pub fn replay(machine: &MachineSpec, solution: &Solution) -> Result<ReplayReport, ReplayError> {
    ForwardReplay::new(machine, solution).finish()
}
