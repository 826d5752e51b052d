//! Full integration tests

use revtape::machine::{bundled, MachineError, RandomMachineConfig};
use revtape::search::{SearchEvent, Step, TracingObserver};
use revtape::*;
use test_helpers::*;

#[test]
fn test_end_to_end_from_text() {
    let machine: MachineSpec = SCENARIO_TEXT.parse().expect("scenario text decodes");
    assert_eq!(machine, create_scenario_machine());

    let report = Solver::new(&machine, SolverConfig::default())
        .unwrap()
        .run_with(&mut TracingObserver)
        .unwrap();
    let solution = report.outcome.solution().expect("solvable");
    assert_eq!(solution.steps(), 3);
    assert!(replay(&machine, solution).unwrap().is_consistent());
    assert_eq!(
        solution.tape.view(solution.head, Some(0)).to_string(),
        "...[{0}0]1(0)..."
    );
}

#[test]
fn test_bundled_machines_search_stays_consistent() {
    // bounded number of decisions per machine; checks the frame invariant
    // and that any solution found replays cleanly
    for index in 1..=bundled::COUNT {
        let machine = bundled::load(index).unwrap();
        let solver = Solver::new(&machine, SolverConfig::for_depth(64)).unwrap();
        let mut search = solver.start().unwrap();

        for _ in 0..20_000 {
            let state = search.state();
            assert_eq!(state.frames().len(), state.history().len() + 1);
            match search.step(&mut ()).unwrap() {
                Step::Finished(Outcome::Success(solution)) => {
                    let report = replay(&machine, &solution).unwrap();
                    assert!(report.is_consistent(), "machine {}: {:?}", index, report.anomalies);
                    break;
                }
                Step::Finished(_) => break,
                _ => {}
            }
        }
    }
}

#[test]
fn test_random_machines_end_to_end() {
    let config = small_random_config();
    for seed in 0..50 {
        let machine = config.generate_seeded(seed).unwrap();
        if let Outcome::Success(solution) = solve(&machine, 10, 10).unwrap() {
            // the generator never lets the start state accept directly
            assert!(solution.steps() >= 2);
            assert!(replay(&machine, &solution).unwrap().is_consistent());
        }
    }
}

#[test]
fn test_capacity_is_checked_up_front() {
    let machine = create_scenario_machine();
    let config = SolverConfig::for_depth(10).with_initial_head(5);
    assert!(matches!(
        Solver::new(&machine, config),
        Err(SolveError::Capacity { .. })
    ));
    assert!(matches!(
        solve(&machine, 10, 9),
        Err(SolveError::Capacity { .. })
    ));
}

#[test]
fn test_observer_sees_conflicts_and_rollbacks() {
    let machine = MachineSpec::builder()
        .accept_state(9)
        .rule(1, 'p', 9, 'q', Move::Right) // 0
        .rule(2, 'y', 1, 'z', Move::Left) // 1
        .rule(0, 'w', 2, 'r', Move::Right) // 2: lands on the 'p' rule 0 reads
        .build()
        .unwrap();
    let solver = Solver::new(&machine, SolverConfig::for_depth(4)).unwrap();
    let mut events = Vec::new();
    let report = solver.run_with(&mut events).unwrap();

    assert_eq!(report.outcome, Outcome::Failure);
    assert!(events
        .iter()
        .any(|event| matches!(event, SearchEvent::Conflict { rule: 2, .. })));
    assert!(events.contains(&SearchEvent::Rollback {
        depth: 1,
        rule: 1,
        restored: 0
    }));
    assert!(events.contains(&SearchEvent::Rollback {
        depth: 0,
        rule: 0,
        restored: 0
    }));
    assert_eq!(events.last(), Some(&SearchEvent::Exhausted));
}

#[test]
fn test_invalid_random_config_is_rejected() {
    let config = RandomMachineConfig {
        state_count: 4,
        ..RandomMachineConfig::default()
    };
    assert!(matches!(
        config.generate_seeded(0),
        Err(MachineError::InvalidMachine(_))
    ));
}
