//! Machine descriptions for the reverse search
//!
//! A machine is an ordered rule table plus disjoint accept and reject state
//! sets. Rule order is significant: it is the tie-break order of the search.
//! - Single tape, single head
//! - States are small integers, `START_STATE` is 0
//! - Symbols are single characters, `BLANK` is reserved

pub mod bundled;
pub mod random;
mod text;
mod transition;

pub use random::RandomMachineConfig;
pub use transition::{Move, Rule};

use bitvec::prelude::*;
use thiserror::Error;

/// Tape symbol
pub type Symbol = char;

/// Machine state
pub type StateId = u16;

/// Position of a rule in the rule table
pub type RuleIndex = usize;

/// State every forward run starts in
pub const START_STATE: StateId = 0;

/// Reserved symbol of cells no rule has constrained
pub const BLANK: Symbol = '#';

/// Errors raised while building or decoding a machine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MachineError {
    /// Invalid machine configuration
    #[error("Invalid machine configuration: {0}")]
    InvalidMachine(String),

    /// A state is listed as both accepting and rejecting
    #[error("State {0} is both an accept and a reject state")]
    OverlappingStates(StateId),

    /// A rule uses the reserved blank symbol
    #[error("Rule #{rule} uses the reserved blank symbol")]
    ReservedSymbol {
        /// Offending rule
        rule: RuleIndex,
    },

    /// Text description could not be decoded
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What was wrong with the line
        message: String,
    },
}

/// Set of states with O(1) membership and stable listing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateSet {
    /// States in insertion order (used for display)
    members: Vec<StateId>,

    /// Membership bits indexed by state
    mask: BitVec,
}

impl StateSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a state; returns false if it was already present
    pub fn insert(&mut self, state: StateId) -> bool {
        let idx = usize::from(state);
        if idx >= self.mask.len() {
            self.mask.resize(idx + 1, false);
        }
        if self.mask[idx] {
            return false;
        }
        self.mask.set(idx, true);
        self.members.push(state);
        true
    }

    /// Membership test
    pub fn contains(&self, state: StateId) -> bool {
        self.mask
            .get(usize::from(state))
            .map(|bit| *bit)
            .unwrap_or(false)
    }

    /// States in insertion order
    pub fn as_slice(&self) -> &[StateId] {
        &self.members
    }

    /// Number of states
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl FromIterator<StateId> for StateSet {
    fn from_iter<I: IntoIterator<Item = StateId>>(iter: I) -> Self {
        let mut set = StateSet::new();
        for state in iter {
            set.insert(state);
        }
        set
    }
}

/// Immutable machine description consumed by the solver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineSpec {
    /// Rule table in tie-break order
    rules: Vec<Rule>,

    /// Accepting states
    accept_states: StateSet,

    /// Rejecting states
    reject_states: StateSet,
}

impl MachineSpec {
    /// Create fluent builder
    pub fn builder() -> MachineBuilder {
        MachineBuilder::new()
    }

    /// Rule table
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rule by index
    pub fn rule(&self, index: RuleIndex) -> Option<&Rule> {
        self.rules.get(index)
    }

    /// Accepting states
    pub fn accept_states(&self) -> &StateSet {
        &self.accept_states
    }

    /// Rejecting states
    pub fn reject_states(&self) -> &StateSet {
        &self.reject_states
    }

    /// Check if state is accepting
    pub fn is_accept(&self, state: StateId) -> bool {
        self.accept_states.contains(state)
    }

    /// Check if state is rejecting
    pub fn is_reject(&self, state: StateId) -> bool {
        self.reject_states.contains(state)
    }

    /// Check if in halting state
    pub fn is_halted(&self, state: StateId) -> bool {
        self.is_accept(state) || self.is_reject(state)
    }

    /// Content hash of the canonical text form
    pub fn fingerprint(&self) -> blake3::Hash {
        blake3::hash(self.to_string().as_bytes())
    }
}

/// Builder for machine descriptions (fluent API)
#[derive(Debug, Default)]
pub struct MachineBuilder {
    accept_states: Vec<StateId>,
    reject_states: Vec<StateId>,
    rules: Vec<Rule>,
}

impl MachineBuilder {
    /// Create new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an accepting state
    pub fn accept_state(mut self, state: StateId) -> Self {
        self.accept_states.push(state);
        self
    }

    /// Add several accepting states
    pub fn accept_states(mut self, states: impl IntoIterator<Item = StateId>) -> Self {
        self.accept_states.extend(states);
        self
    }

    /// Add a rejecting state
    pub fn reject_state(mut self, state: StateId) -> Self {
        self.reject_states.push(state);
        self
    }

    /// Add several rejecting states
    pub fn reject_states(mut self, states: impl IntoIterator<Item = StateId>) -> Self {
        self.reject_states.extend(states);
        self
    }

    /// Append a rule, in forward reading order
    pub fn rule(
        mut self,
        before_state: StateId,
        input_symbol: Symbol,
        after_state: StateId,
        output_symbol: Symbol,
        movement: Move,
    ) -> Self {
        self.rules.push(Rule::new(
            before_state,
            input_symbol,
            after_state,
            output_symbol,
            movement,
        ));
        self
    }

    /// Append an already constructed rule
    pub fn push_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Build the machine
    pub fn build(self) -> Result<MachineSpec, MachineError> {
        if self.accept_states.is_empty() {
            return Err(MachineError::InvalidMachine(
                "at least one accept state is required".to_string(),
            ));
        }

        let accept_states: StateSet = self.accept_states.into_iter().collect();
        let reject_states: StateSet = self.reject_states.into_iter().collect();

        if let Some(&state) = reject_states
            .as_slice()
            .iter()
            .find(|&&state| accept_states.contains(state))
        {
            return Err(MachineError::OverlappingStates(state));
        }

        if let Some(rule) = self
            .rules
            .iter()
            .position(|rule| rule.input_symbol == BLANK || rule.output_symbol == BLANK)
        {
            return Err(MachineError::ReservedSymbol { rule });
        }

        Ok(MachineSpec {
            rules: self.rules,
            accept_states,
            reject_states,
        })
    }
}
