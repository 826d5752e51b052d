use proptest::prelude::*;
use revtape::machine::StateId;
use revtape::search::{Solver, Step};
use revtape::tape::Tape;
use revtape::{replay, solve, Outcome, SolverConfig};
use test_helpers::*;

const DEPTH: usize = 8;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_solution_replays_cleanly(seed in any::<u64>()) {
        let machine = small_random_config()
            .generate_seeded(seed)
            .expect("generator accepts config");
        let outcome = solve(&machine, DEPTH, DEPTH).expect("solve succeeds");

        if let Outcome::Success(solution) = outcome {
            prop_assert!(solution.steps() <= DEPTH);
            let report = replay(&machine, &solution).expect("replay succeeds");
            prop_assert!(report.is_consistent(), "anomalies: {:?}", report.anomalies);
            prop_assert_eq!(report.final_head, DEPTH);
        }
    }

    #[test]
    fn rollback_restores_exact_state(seed in any::<u64>()) {
        let machine = small_random_config()
            .generate_seeded(seed)
            .expect("generator accepts config");
        let solver = Solver::new(&machine, SolverConfig::for_depth(DEPTH)).unwrap();
        let mut search = solver.start().unwrap();

        // snapshot taken before each applied step that is still live
        let mut snapshots: Vec<(Tape, usize, Option<StateId>)> = Vec::new();
        loop {
            let state = search.state();
            prop_assert_eq!(state.frames().len(), state.history().len() + 1);
            let before = (state.tape().clone(), state.head(), state.current_state());

            match search.step(&mut ()).unwrap() {
                Step::Advanced(_) => snapshots.push(before),
                Step::Conflicted(_) => {
                    let state = search.state();
                    prop_assert_eq!(state.tape(), &before.0);
                    prop_assert_eq!(state.head(), before.1);
                }
                Step::Retracted(_) => {
                    let expected = snapshots.pop().expect("retract matches an advance");
                    let state = search.state();
                    prop_assert_eq!(state.tape(), &expected.0);
                    prop_assert_eq!(state.head(), expected.1);
                    prop_assert_eq!(state.current_state(), expected.2);
                }
                Step::Finished(_) => break,
            }
        }
    }

    #[test]
    fn overflow_depth_matches_bound(depth in 1usize..40) {
        let machine = create_overflow_machine();
        let outcome = solve(&machine, depth, depth).unwrap();
        prop_assert_eq!(outcome, Outcome::Overflow);
    }
}
