//! Depth-first reverse search with explicit undo
//!
//! The machine is run backwards from an accepting state. Each depth owns a
//! [`SearchFrame`]; a candidate that fits the tape is applied and a new frame
//! is pushed, an exhausted frame is popped and the step below it undone.
//!
//! Invariant while searching: `frames.len() == history.len() + 1`.

use super::events::{SearchEvent, SearchObserver};
use super::frame::SearchFrame;
use super::{Outcome, SearchReport, SearchStats, Solution};
use crate::machine::{MachineSpec, RuleIndex, StateId, START_STATE};
use crate::tape::{Tape, TapeError, UndoLog, Written};
use crate::{SolveError, SolverConfig};

/// Mutable state of one search, owned by a single [`Search`]
#[derive(Debug, Clone)]
pub struct SearchState {
    tape: Tape,
    undo: UndoLog,
    head: usize,
    /// `None` until the first rule is applied
    current_state: Option<StateId>,
    /// Applied rules, last-fired (forward) first
    history: Vec<RuleIndex>,
    frames: Vec<SearchFrame>,
}

impl SearchState {
    fn new(config: &SolverConfig) -> Result<Self, SolveError> {
        Ok(Self {
            tape: Tape::blank(config.tape_len, config.initial_head)?,
            undo: UndoLog::new(),
            head: config.initial_head,
            current_state: None,
            history: Vec::with_capacity(config.max_depth),
            frames: vec![SearchFrame::accepting()],
        })
    }

    /// Number of applied steps
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    /// Tape window
    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Undo log
    pub fn undo_log(&self) -> &UndoLog {
        &self.undo
    }

    /// Head position
    pub fn head(&self) -> usize {
        self.head
    }

    /// State reached so far (`None` before the first step)
    pub fn current_state(&self) -> Option<StateId> {
        self.current_state
    }

    /// Applied rule indices
    pub fn history(&self) -> &[RuleIndex] {
        &self.history
    }

    /// Frame stack
    pub fn frames(&self) -> &[SearchFrame] {
        &self.frames
    }

    fn out_of_window(&self) -> TapeError {
        TapeError::OutOfWindow {
            position: self.head,
            len: self.tape.len(),
        }
    }

    /// Undo the most recent step; `None` at depth 0
    fn retract(&mut self, machine: &MachineSpec) -> Result<Option<(RuleIndex, usize)>, SolveError> {
        let Some(index) = self.history.pop() else {
            return Ok(None);
        };
        self.frames.pop();
        let depth = self.history.len();
        let rule = machine.rules()[index];

        self.tape.erase(self.head)?;
        let restored = self.undo.rollback_to(depth, &mut self.tape)?;
        self.head = rule
            .movement
            .apply(self.head)
            .ok_or_else(|| self.out_of_window())?;
        self.current_state = if depth == 0 {
            None
        } else {
            Some(rule.after_state)
        };

        Ok(Some((index, restored)))
    }

    fn to_solution(&self) -> Solution {
        Solution {
            history: self.history.clone(),
            tape: self.tape.clone(),
            head: self.head,
        }
    }
}

/// Result of a single [`Search::step`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A rule was applied and a new frame pushed
    Advanced(RuleIndex),
    /// The candidate conflicted with the tape; same frame, no step consumed
    Conflicted(RuleIndex),
    /// The top frame was exhausted and the step below it undone
    Retracted(RuleIndex),
    /// Search reached a terminal outcome
    Finished(Outcome),
}

/// A running search over one machine
#[derive(Debug)]
pub struct Search<'m> {
    machine: &'m MachineSpec,
    max_depth: usize,
    state: SearchState,
    stats: SearchStats,
    finished: bool,
}

impl<'m> Search<'m> {
    fn new(machine: &'m MachineSpec, config: &SolverConfig) -> Result<Self, SolveError> {
        Ok(Self {
            machine,
            max_depth: config.max_depth,
            state: SearchState::new(config)?,
            stats: SearchStats::default(),
            finished: false,
        })
    }

    /// Current search state
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Counters so far
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Whether a terminal outcome was reached
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Make one decision: try the next candidate or roll back
    pub fn step<O: SearchObserver + ?Sized>(&mut self, observer: &mut O) -> Result<Step, SolveError> {
        if self.finished {
            return Err(SolveError::SearchFinished);
        }

        let depth = self.state.depth();
        let candidate = self
            .state
            .frames
            .last_mut()
            .and_then(|frame| frame.next(self.machine));

        let Some(index) = candidate else {
            return match self.state.retract(self.machine)? {
                Some((rule, restored)) => {
                    self.stats.rollbacks += 1;
                    observer.on_event(&SearchEvent::Rollback {
                        depth: depth - 1,
                        rule,
                        restored,
                    });
                    Ok(Step::Retracted(rule))
                }
                None => {
                    observer.on_event(&SearchEvent::Exhausted);
                    Ok(self.finish(Outcome::Failure))
                }
            };
        };

        self.stats.candidates += 1;
        observer.on_event(&SearchEvent::Candidate { depth, rule: index });

        let rule = self.machine.rules()[index];
        let state = &mut self.state;
        let target = rule
            .movement
            .retreat(state.head)
            .ok_or_else(|| state.out_of_window())?;

        match state.tape.write(target, rule.output_symbol) {
            Ok(Written::Filled) => {}
            Ok(Written::Agreed(prior)) => state.undo.push_undo(depth, target, prior),
            Err(TapeError::Conflict(conflict)) => {
                self.stats.conflicts += 1;
                observer.on_event(&SearchEvent::Conflict {
                    depth,
                    rule: index,
                    conflict,
                });
                return Ok(Step::Conflicted(index));
            }
            Err(err) => return Err(err.into()),
        }

        // the forward run reads input_symbol here
        state.tape.set(target, rule.input_symbol)?;
        state.head = target;
        state.current_state = Some(rule.before_state);
        state.history.push(index);

        self.stats.applied += 1;
        self.stats.max_depth_reached = self.stats.max_depth_reached.max(state.history.len());
        observer.on_event(&SearchEvent::Applied {
            depth,
            rule: index,
            head: target,
            state: rule.before_state,
        });

        if rule.before_state == START_STATE {
            let solution = state.to_solution();
            observer.on_event(&SearchEvent::Solved {
                steps: solution.steps(),
            });
            return Ok(self.finish(Outcome::Success(solution)));
        }

        if state.history.len() >= self.max_depth {
            observer.on_event(&SearchEvent::Overflow {
                depth: state.history.len(),
            });
            return Ok(self.finish(Outcome::Overflow));
        }

        state.frames.push(SearchFrame::normal(rule.before_state));
        Ok(Step::Advanced(index))
    }

    fn finish(&mut self, outcome: Outcome) -> Step {
        self.finished = true;
        Step::Finished(outcome)
    }

    /// Step until a terminal outcome
    pub fn run_to_end<O: SearchObserver + ?Sized>(
        &mut self,
        observer: &mut O,
    ) -> Result<Outcome, SolveError> {
        loop {
            if let Step::Finished(outcome) = self.step(observer)? {
                return Ok(outcome);
            }
        }
    }
}

/// Reverse-search solver for one machine
#[derive(Debug, Clone)]
pub struct Solver<'m> {
    machine: &'m MachineSpec,
    config: SolverConfig,
}

impl<'m> Solver<'m> {
    /// Create a solver, validating the tape capacity up front
    pub fn new(machine: &'m MachineSpec, config: SolverConfig) -> Result<Self, SolveError> {
        config.validate()?;
        Ok(Self { machine, config })
    }

    /// Configuration in use
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Start a fresh search that can be driven step by step
    pub fn start(&self) -> Result<Search<'m>, SolveError> {
        Search::new(self.machine, &self.config)
    }

    /// Run a fresh search to completion, discarding trace events
    pub fn run(&self) -> Result<SearchReport, SolveError> {
        self.run_with(&mut ())
    }

    /// Run a fresh search to completion, reporting to `observer`
    pub fn run_with<O: SearchObserver + ?Sized>(
        &self,
        observer: &mut O,
    ) -> Result<SearchReport, SolveError> {
        let mut search = self.start()?;
        let outcome = search.run_to_end(observer)?;
        Ok(SearchReport {
            outcome,
            stats: search.stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{Move, BLANK};
    use crate::search::FrameMode;

    /// Two ways into state 2; the first one forces a conflict two levels up
    fn backtracking_machine() -> MachineSpec {
        MachineSpec::builder()
            .accept_state(9)
            .rule(2, 'x', 9, 'x', Move::Terminal) // 0
            .rule(1, 'a', 2, 'b', Move::Right) // 1
            .rule(3, 'c', 2, 'd', Move::Left) // 2
            .rule(0, 'z', 1, 'q', Move::Left) // 3: writes back onto origin, conflicts
            .rule(0, 'e', 3, 'x', Move::Right) // 4
            .build()
            .unwrap()
    }

    fn config() -> SolverConfig {
        SolverConfig::for_depth(8)
    }

    #[test]
    fn test_frames_track_history() {
        let machine = backtracking_machine();
        let solver = Solver::new(&machine, config()).unwrap();
        let mut search = solver.start().unwrap();
        let mut events = Vec::new();

        loop {
            let state = search.state();
            assert_eq!(state.frames().len(), state.history().len() + 1);
            if let Step::Finished(_) = search.step(&mut events).unwrap() {
                break;
            }
        }
        assert!(matches!(search.step(&mut ()), Err(SolveError::SearchFinished)));
    }

    #[test]
    fn test_conflict_then_rollback_then_success() {
        let machine = backtracking_machine();
        let solver = Solver::new(&machine, config()).unwrap();
        let mut search = solver.start().unwrap();
        let mut events = Vec::new();
        let origin = config().initial_head;

        assert_eq!(search.step(&mut events).unwrap(), Step::Advanced(0));
        assert_eq!(search.state().current_state(), Some(2));
        assert_eq!(search.state().tape().read(origin), Ok('x'));

        // rule 1 moved right forward, so the reverse walk goes left
        assert_eq!(search.step(&mut events).unwrap(), Step::Advanced(1));
        assert_eq!(search.state().head(), origin - 1);
        assert_eq!(search.state().tape().read(origin - 1), Ok('a'));

        // rule 3 would write 'q' onto the origin which holds 'x'
        assert_eq!(search.step(&mut events).unwrap(), Step::Conflicted(3));
        assert_eq!(search.state().depth(), 2);

        assert_eq!(search.step(&mut events).unwrap(), Step::Retracted(1));
        assert_eq!(search.state().head(), origin);
        assert_eq!(search.state().current_state(), Some(2));
        assert_eq!(search.state().tape().read(origin - 1), Ok(BLANK));
        assert_eq!(search.state().tape().read(origin), Ok('x'));

        assert_eq!(search.step(&mut events).unwrap(), Step::Advanced(2));
        assert_eq!(search.state().head(), origin + 1);

        // rule 4 moves right forward: reverse lands back on the origin,
        // which must agree with its output 'x' and gets logged
        match search.step(&mut events).unwrap() {
            Step::Finished(Outcome::Success(solution)) => {
                assert_eq!(solution.history, vec![0, 2, 4]);
                assert_eq!(solution.head, origin);
                assert_eq!(solution.tape.read(origin), Ok('e'));
                assert_eq!(solution.tape.read(origin + 1), Ok('c'));
            }
            other => panic!("expected success, got {:?}", other),
        }
        assert_eq!(search.state().undo_log().len(), 1);

        assert!(events.iter().any(|e| matches!(e, SearchEvent::Conflict { rule: 3, .. })));
        assert!(events.contains(&SearchEvent::Rollback {
            depth: 1,
            rule: 1,
            restored: 0
        }));
        assert_eq!(events.last(), Some(&SearchEvent::Solved { steps: 3 }));
    }

    #[test]
    fn test_rollback_restores_revisited_cell() {
        // 5 re-enters the origin cell (agreeing), then its only successor
        // conflicts, forcing a rollback through the undo log
        let machine = MachineSpec::builder()
            .accept_state(9)
            .rule(2, 'x', 9, 'x', Move::Terminal) // 0
            .rule(3, 'c', 2, 'd', Move::Left) // 1
            .rule(4, 'e', 3, 'x', Move::Right) // 2: back onto origin
            .rule(5, 'k', 4, 'm', Move::Right) // 3: dead end, nothing enters state 5
            .rule(0, 'f', 3, 'x', Move::Right) // 4
            .build()
            .unwrap();
        let origin = config().initial_head;
        let solver = Solver::new(&machine, config()).unwrap();
        let mut search = solver.start().unwrap();

        assert_eq!(search.step(&mut ()).unwrap(), Step::Advanced(0));
        assert_eq!(search.step(&mut ()).unwrap(), Step::Advanced(1));
        assert_eq!(search.step(&mut ()).unwrap(), Step::Advanced(2));
        assert_eq!(search.state().tape().read(origin), Ok('e'));
        assert_eq!(search.state().undo_log().len(), 1);

        assert_eq!(search.step(&mut ()).unwrap(), Step::Advanced(3));
        assert_eq!(search.state().head(), origin - 1);
        // nothing leads into state 5
        assert_eq!(search.step(&mut ()).unwrap(), Step::Retracted(3));
        assert_eq!(search.step(&mut ()).unwrap(), Step::Retracted(2));
        assert_eq!(search.state().tape().read(origin), Ok('x'));
        assert!(search.state().undo_log().is_empty());
        assert_eq!(search.state().head(), origin + 1);

        match search.step(&mut ()).unwrap() {
            Step::Finished(Outcome::Success(solution)) => {
                assert_eq!(solution.history, vec![0, 1, 4]);
                assert_eq!(solution.tape.read(origin), Ok('f'));
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_frame_modes() {
        let machine = backtracking_machine();
        let solver = Solver::new(&machine, config()).unwrap();
        let mut search = solver.start().unwrap();
        assert_eq!(search.state().frames()[0].mode(), FrameMode::Final);
        search.step(&mut ()).unwrap();
        assert_eq!(search.state().frames()[1].mode(), FrameMode::Normal(2));
    }

    #[test]
    fn test_stats_count_decisions() {
        let machine = backtracking_machine();
        let report = Solver::new(&machine, config()).unwrap().run().unwrap();
        assert!(report.outcome.is_success());
        assert_eq!(report.stats.applied, 4);
        assert_eq!(report.stats.conflicts, 1);
        assert_eq!(report.stats.rollbacks, 1);
        assert_eq!(report.stats.candidates, 5);
        assert_eq!(report.stats.max_depth_reached, 3);
    }
}
