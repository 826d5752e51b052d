//! Candidate rule iterator, one per search depth

use crate::machine::{MachineSpec, Rule, RuleIndex, StateId};

/// Reverse-transition criterion of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMode {
    /// Depth 0: any rule entering an accept state
    Final,
    /// Any non-terminal rule entering the given state
    Normal(StateId),
}

/// One level of the search stack
///
/// The cursor only moves forward, so each rule is offered at most once per
/// frame and an exhausted frame stays exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFrame {
    mode: FrameMode,
    /// Next rule to inspect
    cursor: RuleIndex,
}

impl SearchFrame {
    /// Frame for depth 0
    pub fn accepting() -> Self {
        Self {
            mode: FrameMode::Final,
            cursor: 0,
        }
    }

    /// Frame looking for rules that lead into `state`
    pub fn normal(state: StateId) -> Self {
        Self {
            mode: FrameMode::Normal(state),
            cursor: 0,
        }
    }

    /// Frame criterion
    pub fn mode(&self) -> FrameMode {
        self.mode
    }

    /// Next rule index to inspect
    pub fn cursor(&self) -> RuleIndex {
        self.cursor
    }

    /// Whether `rule` satisfies this frame's criterion
    pub fn matches(&self, rule: &Rule, machine: &MachineSpec) -> bool {
        match self.mode {
            FrameMode::Final => machine.is_accept(rule.after_state),
            FrameMode::Normal(state) => !rule.is_terminal() && rule.after_state == state,
        }
    }

    /// Next matching rule at or after the cursor
    pub fn next(&mut self, machine: &MachineSpec) -> Option<RuleIndex> {
        let rules = machine.rules();
        while self.cursor < rules.len() {
            let index = self.cursor;
            self.cursor += 1;
            if self.matches(&rules[index], machine) {
                return Some(index);
            }
        }
        None
    }
}
