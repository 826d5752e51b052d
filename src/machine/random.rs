//! Random machine generation
//!
//! Random machines rarely have short accepting runs; the defaults are tuned so
//! that a few trials in a hundred do.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{MachineError, MachineSpec, Move, Rule, StateId, Symbol, START_STATE};

/// Parameters of the random machine generator
#[derive(Debug, Clone)]
pub struct RandomMachineConfig {
    /// Number of states (10 to 100 is reasonable)
    pub state_count: StateId,

    /// Number of symbols, drawn from `'A'..` (2 to 26)
    pub symbol_count: u8,

    /// Number of rules in the table
    pub rule_count: usize,

    /// Percentage of moving rules that move right
    pub right_rate: u8,

    /// Upper bound on accept states (at least one is drawn)
    pub max_accept_states: usize,

    /// Upper bound on reject states (at least one is drawn)
    pub max_reject_states: usize,
}

impl Default for RandomMachineConfig {
    fn default() -> Self {
        Self {
            state_count: 42,
            symbol_count: 12,
            rule_count: 240,
            right_rate: 50,
            max_accept_states: 4,
            max_reject_states: 4,
        }
    }
}

impl RandomMachineConfig {
    /// Set number of states
    pub fn with_state_count(mut self, state_count: StateId) -> Self {
        self.state_count = state_count;
        self
    }

    /// Set alphabet size
    pub fn with_symbol_count(mut self, symbol_count: u8) -> Self {
        self.symbol_count = symbol_count;
        self
    }

    /// Set number of rules
    pub fn with_rule_count(mut self, rule_count: usize) -> Self {
        self.rule_count = rule_count;
        self
    }

    /// Set right-move percentage
    pub fn with_right_rate(mut self, right_rate: u8) -> Self {
        self.right_rate = right_rate;
        self
    }

    fn validate(&self) -> Result<(), MachineError> {
        if !(1..=26).contains(&self.symbol_count) {
            return Err(MachineError::InvalidMachine(format!(
                "symbol count {} outside 1..=26",
                self.symbol_count
            )));
        }
        if self.right_rate > 100 {
            return Err(MachineError::InvalidMachine(format!(
                "right rate {} exceeds 100",
                self.right_rate
            )));
        }
        if self.max_accept_states == 0 || self.max_reject_states == 0 {
            return Err(MachineError::InvalidMachine(
                "accept and reject bounds must be > 0".to_string(),
            ));
        }
        // START_STATE must stay outside both sets, so leave room for it
        let needed = self.max_accept_states + self.max_reject_states + 1;
        if usize::from(self.state_count) < needed {
            return Err(MachineError::InvalidMachine(format!(
                "state count {} too small, need at least {}",
                self.state_count, needed
            )));
        }
        Ok(())
    }

    /// Generate a machine from a seed
    pub fn generate_seeded(&self, seed: u64) -> Result<MachineSpec, MachineError> {
        self.generate(&mut StdRng::seed_from_u64(seed))
    }

    /// Generate a machine from the given random source
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Result<MachineSpec, MachineError> {
        self.validate()?;

        let accept_count = rng.gen_range(1..=self.max_accept_states);
        let mut accept_states: Vec<StateId> = Vec::with_capacity(accept_count);
        while accept_states.len() < accept_count {
            let state = self.random_state(rng);
            if state != START_STATE && !accept_states.contains(&state) {
                accept_states.push(state);
            }
        }

        let reject_count = rng.gen_range(1..=self.max_reject_states);
        let mut reject_states: Vec<StateId> = Vec::with_capacity(reject_count);
        while reject_states.len() < reject_count {
            let state = self.random_state(rng);
            if state != START_STATE
                && !accept_states.contains(&state)
                && !reject_states.contains(&state)
            {
                reject_states.push(state);
            }
        }

        let mut rules: Vec<Rule> = Vec::with_capacity(self.rule_count);
        for i in 0..self.rule_count {
            let before_state = if i == 0 {
                START_STATE
            } else {
                self.random_state(rng)
            };
            let input_symbol = self.random_symbol(rng);
            let mut after_state = self.random_state(rng);
            if before_state == START_STATE {
                // one-step accepting runs are not interesting
                while accept_states.contains(&after_state) {
                    after_state = self.random_state(rng);
                }
            }
            if i + 1 == self.rule_count
                && before_state != START_STATE
                && !rules.iter().any(|rule| accept_states.contains(&rule.after_state))
            {
                after_state = accept_states[0];
            }
            let output_symbol = self.random_symbol(rng);
            let movement =
                if accept_states.contains(&after_state) || reject_states.contains(&after_state) {
                    Move::Terminal
                } else if rng.gen_range(0..100) < self.right_rate {
                    Move::Right
                } else {
                    Move::Left
                };
            rules.push(Rule::new(
                before_state,
                input_symbol,
                after_state,
                output_symbol,
                movement,
            ));
        }

        rules
            .into_iter()
            .fold(
                MachineSpec::builder()
                    .accept_states(accept_states)
                    .reject_states(reject_states),
                |builder, rule| builder.push_rule(rule),
            )
            .build()
    }

    fn random_state<R: Rng>(&self, rng: &mut R) -> StateId {
        rng.gen_range(0..self.state_count)
    }

    fn random_symbol<R: Rng>(&self, rng: &mut R) -> Symbol {
        char::from(b'A' + rng.gen_range(0..self.symbol_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_machine_shape() {
        let config = RandomMachineConfig::default();
        for seed in 0..20 {
            let machine = config.generate_seeded(seed).unwrap();
            assert_eq!(machine.rules().len(), config.rule_count);
            assert_eq!(machine.rules()[0].before_state, START_STATE);
            assert!((1..=4).contains(&machine.accept_states().len()));
            assert!((1..=4).contains(&machine.reject_states().len()));

            for rule in machine.rules() {
                assert_eq!(rule.is_terminal(), machine.is_halted(rule.after_state));
                if rule.before_state == START_STATE {
                    assert!(!machine.is_accept(rule.after_state));
                }
                assert!(('A'..='L').contains(&rule.input_symbol));
                assert!(('A'..='L').contains(&rule.output_symbol));
            }
        }
    }

    #[test]
    fn test_same_seed_same_machine() {
        let config = RandomMachineConfig::default().with_rule_count(60);
        assert_eq!(
            config.generate_seeded(7).unwrap(),
            config.generate_seeded(7).unwrap()
        );
    }

    #[test]
    fn test_rejects_tiny_state_space() {
        let config = RandomMachineConfig::default().with_state_count(4);
        assert!(matches!(
            config.generate_seeded(1),
            Err(MachineError::InvalidMachine(_))
        ));
    }
}
