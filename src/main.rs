use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use revtape::machine::{bundled, MachineSpec, RandomMachineConfig, START_STATE};
use revtape::replay::{ForwardReplay, ReplayInconsistency};
use revtape::search::TracingObserver;
use revtape::{Outcome, Solution, Solver, SolverConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Rules shown in the per-trial machine listing
const SUMMARY_RULES: usize = 80;

/// Trials run by `random` when no count is given
const DEFAULT_TRIALS: usize = 100;

#[derive(Parser, Debug)]
#[command(
    name = "revtape",
    about = "Find accepting inputs of tape machines by running them backwards"
)]
struct Cli {
    /// Maximum number of reverse steps per search.
    #[arg(long, global = true, default_value_t = SolverConfig::DEFAULT_MAX_DEPTH)]
    max_depth: usize,
    /// Stop once a solution has at least this many steps.
    #[arg(long, global = true, default_value_t = 3)]
    interesting_steps: usize,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Solve freshly generated random machines.
    Random {
        /// Number of trials (0 or missing: 100).
        count: Option<usize>,
        /// Seed of the first trial; later trials count up from it.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Solve one of the bundled machines.
    Input {
        /// Bundled machine, 1 to 6 (anything else: 6).
        index: Option<usize>,
    },
    /// Solve a machine description read from a file.
    File {
        /// Machine description in text format.
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = SolverConfig::for_depth(cli.max_depth);
    config.validate().context("invalid --max-depth")?;

    match cli.command.unwrap_or(Commands::Random {
        count: None,
        seed: None,
    }) {
        Commands::Random { count, seed } => {
            run_random(count, seed, config, cli.interesting_steps)?
        }
        Commands::Input { index } => {
            let index = bundled::resolve_index(index.unwrap_or(bundled::DEFAULT_INDEX));
            let machine = bundled::load(index)
                .with_context(|| format!("bundled machine {} is malformed", index))?;
            run_trial(1, &machine, config, cli.interesting_steps)?;
        }
        Commands::File { path } => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read machine from {}", path.display()))?;
            let machine: MachineSpec = text
                .parse()
                .with_context(|| format!("failed to decode machine in {}", path.display()))?;
            run_trial(1, &machine, config, cli.interesting_steps)?;
        }
    }

    Ok(())
}

fn run_random(
    count: Option<usize>,
    seed: Option<u64>,
    config: SolverConfig,
    interesting_steps: usize,
) -> Result<()> {
    let count = match count {
        None | Some(0) => DEFAULT_TRIALS,
        Some(count) => count,
    };
    let base_seed = seed.unwrap_or_else(rand::random);
    info!(count, base_seed, "random trials");

    let generator = RandomMachineConfig::default();
    for trial in 1..=count {
        let seed = base_seed.wrapping_add(trial as u64 - 1);
        let machine = generator
            .generate_seeded(seed)
            .with_context(|| format!("failed to generate machine for seed {}", seed))?;
        if run_trial(trial, &machine, config, interesting_steps)? {
            info!(trial, seed, "stopping early");
            break;
        }
    }
    Ok(())
}

/// Solve one machine and print the result; `true` if the answer is interesting
fn run_trial(
    trial: usize,
    machine: &MachineSpec,
    config: SolverConfig,
    interesting_steps: usize,
) -> Result<bool> {
    print!("{}", machine.summary(SUMMARY_RULES));
    info!(
        trial,
        rules = machine.rules().len(),
        fingerprint = %machine.fingerprint(),
        "solving"
    );

    let report = Solver::new(machine, config)?
        .run_with(&mut TracingObserver)
        .with_context(|| format!("search failed (solve#{})", trial))?;
    let stats = &report.stats;
    info!(
        trial,
        outcome = report.outcome.label(),
        candidates = stats.candidates,
        conflicts = stats.conflicts,
        rollbacks = stats.rollbacks,
        max_depth_reached = stats.max_depth_reached,
        "search finished"
    );

    match &report.outcome {
        Outcome::Success(solution) => {
            println!(
                "answer (solve#{}): {}",
                trial,
                solution.tape.view(solution.head, Some(START_STATE))
            );
            print_replay(machine, solution)?;
            if solution.steps() >= interesting_steps {
                println!("has interesting answer!");
                return Ok(true);
            }
        }
        Outcome::Failure => println!("no answer (solve#{})", trial),
        Outcome::Overflow => println!("step overflow (solve#{})", trial),
    }
    Ok(false)
}

fn print_replay(machine: &MachineSpec, solution: &Solution) -> Result<()> {
    let mut replay = ForwardReplay::new(machine, solution);
    while let Some(step) = replay.next_step()?.cloned() {
        let markers: String = step
            .anomalies
            .iter()
            .map(|anomaly| format!("!!{}!! ", anomaly.marker()))
            .collect();
        let rule = machine
            .rule(step.rule)
            .map(ToString::to_string)
            .unwrap_or_default();
        println!(
            "  {}#{}: {} => {}",
            markers,
            step.rule,
            rule,
            replay.tape().view(replay.head(), Some(replay.state()))
        );
    }

    let report = replay.finish()?;
    for anomaly in &report.anomalies {
        if matches!(
            anomaly,
            ReplayInconsistency::IncorrectEndHead { .. } | ReplayInconsistency::NotAccepting { .. }
        ) {
            println!("  !!{}!! {}", anomaly.marker(), anomaly);
        }
    }
    Ok(())
}
