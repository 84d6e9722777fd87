//! GA-TSP Solver - Command Line Interface
//!
//! Solve TSPLIB instances with the genetic engine, compare it against the
//! baselines, or sweep strategies and parameters across repeated runs.

use clap::{Parser, Subcommand, ValueEnum};

use ga_tsp_solver::experiments::ExperimentSuite;
use ga_tsp_solver::ga::{
    CrossoverType, GaConfig, GeneticEngine, InitializationType, MutationType, SelectionType,
    StopCondition,
};
use ga_tsp_solver::instance::TspInstance;
use ga_tsp_solver::SolverError;

use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "ga-tsp-solver")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "A genetic-algorithm solver for the Traveling Salesman Problem")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a single instance with one configuration
    Solve {
        /// Path to the TSPLIB instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// Population initialization strategy
        #[arg(long, value_enum, default_value = "greedy")]
        init: Initialization,

        /// Parent selection strategy
        #[arg(long, value_enum, default_value = "tournament")]
        selection: Selection,

        /// Crossover operator
        #[arg(long, value_enum, default_value = "ox")]
        crossover: Crossover,

        /// Mutation operator
        #[arg(long, value_enum, default_value = "swap")]
        mutation: Mutation,

        /// Crossover probability
        #[arg(long, default_value = "0.7")]
        crossover_prob: f64,

        /// Mutation probability
        #[arg(long, default_value = "0.1")]
        mutation_prob: f64,

        /// Population size
        #[arg(short, long, default_value = "500")]
        population: usize,

        /// Number of elite tours carried over unchanged
        #[arg(long, default_value = "50")]
        elite: usize,

        /// Tournament size
        #[arg(long, default_value = "100")]
        tournament: usize,

        /// Generation limit (ignored when --evaluations is given)
        #[arg(short, long, default_value = "3000")]
        generations: usize,

        /// Stop after this many evaluated individuals instead of a
        /// generation count
        #[arg(long, conflicts_with = "generations")]
        evaluations: Option<usize>,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Write per-generation metrics to this CSV file
        #[arg(short, long)]
        metrics: Option<PathBuf>,

        /// Write the best tour as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare the GA against the greedy and random baselines
    Compare {
        /// Path to the TSPLIB instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// Number of GA runs
        #[arg(short, long, default_value = "10")]
        runs: usize,

        /// Output CSV file (defaults to a timestamped name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Sweep strategies or parameters over repeated runs
    Sweep {
        /// Path to the TSPLIB instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// Which axis family to sweep
        #[arg(short, long, value_enum, default_value = "strategies")]
        kind: SweepKind,

        /// Number of runs per variant
        #[arg(short, long, default_value = "10")]
        runs: usize,

        /// Output CSV file (defaults to a timestamped name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Initialization {
    Greedy,
    Random,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Selection {
    Tournament,
    Roulette,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Crossover {
    Ox,
    Pmx,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Mutation {
    Swap,
    Inverse,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum SweepKind {
    Strategies,
    Parameters,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Solve {
            instance,
            init,
            selection,
            crossover,
            mutation,
            crossover_prob,
            mutation_prob,
            population,
            elite,
            tournament,
            generations,
            evaluations,
            seed,
            metrics,
            output,
        } => {
            let stop_condition = match evaluations {
                Some(limit) => StopCondition::Evaluations(limit),
                None => StopCondition::Generations(generations),
            };
            let config = GaConfig {
                initialization: match init {
                    Initialization::Greedy => InitializationType::Greedy,
                    Initialization::Random => InitializationType::Random,
                },
                selection: match selection {
                    Selection::Tournament => SelectionType::Tournament,
                    Selection::Roulette => SelectionType::Roulette,
                },
                crossover: match crossover {
                    Crossover::Ox => CrossoverType::Ox,
                    Crossover::Pmx => CrossoverType::Pmx,
                },
                mutation: match mutation {
                    Mutation::Swap => MutationType::Swap,
                    Mutation::Inverse => MutationType::Inverse,
                },
                crossover_probability: crossover_prob,
                mutation_probability: mutation_prob,
                population_size: population,
                elite_size: elite,
                tournament_size: tournament,
                stop_condition,
                seed,
            };
            solve(&instance, config, metrics, output)
        }

        Commands::Compare {
            instance,
            runs,
            output,
        } => compare(&instance, runs, output),

        Commands::Sweep {
            instance,
            kind,
            runs,
            output,
        } => sweep(&instance, kind, runs, output),
    };

    if let Err(e) = result {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn solve(
    path: &Path,
    config: GaConfig,
    metrics: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<(), SolverError> {
    let instance = TspInstance::from_file(path)?;
    println!(
        "Instance: {} ({} cities, {:?})",
        instance.name, instance.dimension, instance.edge_weight_type
    );

    let start = Instant::now();
    let mut engine = GeneticEngine::new(&instance.matrix, config)?;
    let best = match metrics {
        Some(metrics_path) => engine.run_with_metrics(metrics_path)?,
        None => engine.run()?,
    };
    let elapsed = start.elapsed().as_secs_f64();

    println!("Best cost: {:.1}", best.cost);
    println!(
        "Generations: {}  Evaluations: {}  Time: {:.2}s",
        engine.current_generation(),
        engine.evaluation_count(),
        elapsed
    );

    if let Some(out_path) = output {
        let json = serde_json::to_string_pretty(&best)
            .map_err(|e| SolverError::InvalidInput(e.to_string()))?;
        std::fs::write(&out_path, json)?;
        println!("Best tour written to {:?}", out_path);
    }
    Ok(())
}

fn compare(path: &Path, runs: usize, output: Option<PathBuf>) -> Result<(), SolverError> {
    let instance = TspInstance::from_file(path)?;
    let config = default_experiment_config();

    let mut suite = ExperimentSuite::new(&instance.matrix, runs);
    suite.compare_with_baselines(&config)?;
    print_overview(&suite);

    let out_path = output.unwrap_or_else(|| timestamped_csv(&instance.name, "compare"));
    suite.export_csv(&out_path)?;
    println!("Results exported to {:?}", out_path);
    Ok(())
}

fn sweep(
    path: &Path,
    kind: SweepKind,
    runs: usize,
    output: Option<PathBuf>,
) -> Result<(), SolverError> {
    let instance = TspInstance::from_file(path)?;
    let config = default_experiment_config();

    let mut suite = ExperimentSuite::new(&instance.matrix, runs);
    match kind {
        SweepKind::Strategies => suite.sweep_strategies(&config)?,
        SweepKind::Parameters => suite.sweep_parameters(&config)?,
    }
    print_overview(&suite);

    let out_path = output.unwrap_or_else(|| timestamped_csv(&instance.name, "sweep"));
    suite.export_csv(&out_path)?;
    println!("Results exported to {:?}", out_path);
    Ok(())
}

/// Configuration used by the comparison and sweep experiments, matching the
/// historical benchmark setup.
fn default_experiment_config() -> GaConfig {
    GaConfig {
        initialization: InitializationType::Greedy,
        selection: SelectionType::Tournament,
        crossover: CrossoverType::Pmx,
        mutation: MutationType::Inverse,
        crossover_probability: 0.7,
        mutation_probability: 0.1,
        population_size: 500,
        elite_size: 50,
        tournament_size: 100,
        stop_condition: StopCondition::Generations(3000),
        seed: 42,
    }
}

fn print_overview(suite: &ExperimentSuite) {
    println!(
        "{:<20} {:>6} {:>12} {:>12} {:>12} {:>10}",
        "Label", "Runs", "Best", "Worst", "Avg", "StdDev"
    );
    println!("{}", "-".repeat(76));
    for row in suite.results() {
        println!(
            "{:<20} {:>6} {:>12.1} {:>12.1} {:>12.1} {:>10.2}",
            row.label, row.runs, row.best, row.worst, row.avg, row.std_dev
        );
    }
}

fn timestamped_csv(instance_name: &str, suffix: &str) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y_%m_%d_%H_%M_%S");
    PathBuf::from(format!("{}_{}_{}.csv", instance_name, suffix, stamp))
}
