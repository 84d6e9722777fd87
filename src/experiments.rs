//! Experiment harness: repeated runs, strategy/parameter sweeps and
//! aggregated CSV exports.
//!
//! Parallelism lives only here: whole engine runs are independent (private
//! population, private seeded generator, read-only shared distance matrix)
//! and are spread over a rayon pool. The generational loop itself stays
//! single-threaded.

use std::fs::File;
use std::path::Path;

use ordered_float::OrderedFloat;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::baseline::{greedy_baseline, random_baseline, DEFAULT_RANDOM_SAMPLES};
use crate::error::SolverError;
use crate::ga::{GaConfig, GeneticEngine, StopCondition};
use crate::instance::DistanceMatrix;
use crate::tour::Tour;

/// Aggregate of one batch of final tours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOverview {
    /// What produced the batch (algorithm or swept parameter value)
    pub label: String,
    /// Number of tours aggregated
    pub runs: usize,
    /// Lowest final cost
    pub best: f64,
    /// Highest final cost
    pub worst: f64,
    /// Mean final cost
    pub avg: f64,
    /// Population standard deviation of the final costs
    pub std_dev: f64,
}

/// Summarize a batch of tours under a label.
///
/// Panics if the batch is empty.
pub fn summarize(label: &str, tours: &[Tour]) -> RunOverview {
    let mut costs: Vec<f64> = tours.iter().map(|t| t.cost).collect();
    costs.sort_by_key(|&c| OrderedFloat(c));

    let avg = costs.iter().sum::<f64>() / costs.len() as f64;
    let variance = costs.iter().map(|c| (c - avg).powi(2)).sum::<f64>() / costs.len() as f64;

    RunOverview {
        label: label.to_string(),
        runs: costs.len(),
        best: costs[0],
        worst: costs[costs.len() - 1],
        avg,
        std_dev: variance.sqrt(),
    }
}

/// Collects overview rows across experiment batches and exports them.
pub struct ExperimentSuite<'a> {
    matrix: &'a DistanceMatrix,
    /// Independent engine runs per configuration variant
    runs_per_variant: usize,
    results: Vec<RunOverview>,
}

impl<'a> ExperimentSuite<'a> {
    pub fn new(matrix: &'a DistanceMatrix, runs_per_variant: usize) -> Self {
        ExperimentSuite {
            matrix,
            runs_per_variant,
            results: Vec::new(),
        }
    }

    pub fn results(&self) -> &[RunOverview] {
        &self.results
    }

    /// Run one configuration `runs_per_variant` times in parallel, each run
    /// with its own engine and a seed derived from the configured base seed.
    pub fn run_repeated(&mut self, label: &str, config: &GaConfig) -> Result<(), SolverError> {
        let matrix = self.matrix;
        let tours: Vec<Tour> = (0..self.runs_per_variant)
            .into_par_iter()
            .map(|run| {
                let run_config = GaConfig {
                    seed: config.seed.wrapping_add(run as u64),
                    ..config.clone()
                };
                let mut engine = GeneticEngine::new(matrix, run_config)?;
                engine.run()
            })
            .collect::<Result<_, _>>()?;

        log::info!(
            "{}: {} runs, best {:.1}",
            label,
            tours.len(),
            tours
                .iter()
                .map(|t| t.cost)
                .fold(f64::INFINITY, f64::min)
        );
        self.results.push(summarize(label, &tours));
        Ok(())
    }

    /// Compare the GA against the raw baselines on the same instance.
    pub fn compare_with_baselines(&mut self, config: &GaConfig) -> Result<(), SolverError> {
        let greedy = greedy_baseline(self.matrix);
        self.results.push(summarize("greedy", &greedy));

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let random = random_baseline(self.matrix, DEFAULT_RANDOM_SAMPLES, &mut rng);
        self.results.push(summarize("random", &random));

        self.run_repeated("genetic", config)
    }

    /// Sweep every strategy axis, one alternative at a time from the base
    /// configuration.
    pub fn sweep_strategies(&mut self, base: &GaConfig) -> Result<(), SolverError> {
        use crate::ga::{CrossoverType, InitializationType, MutationType, SelectionType};

        for init in [InitializationType::Greedy, InitializationType::Random] {
            let config = GaConfig {
                initialization: init,
                ..base.clone()
            };
            self.run_repeated(&format!("init-{:?}", init).to_lowercase(), &config)?;
        }
        for selection in [SelectionType::Tournament, SelectionType::Roulette] {
            let config = GaConfig {
                selection,
                ..base.clone()
            };
            self.run_repeated(&format!("select-{:?}", selection).to_lowercase(), &config)?;
        }
        for crossover in [CrossoverType::Ox, CrossoverType::Pmx] {
            let config = GaConfig {
                crossover,
                ..base.clone()
            };
            self.run_repeated(&format!("crossover-{:?}", crossover).to_lowercase(), &config)?;
        }
        for mutation in [MutationType::Swap, MutationType::Inverse] {
            let config = GaConfig {
                mutation,
                ..base.clone()
            };
            self.run_repeated(&format!("mutation-{:?}", mutation).to_lowercase(), &config)?;
        }
        Ok(())
    }

    /// Sweep the numeric parameters around the base configuration.
    pub fn sweep_parameters(&mut self, base: &GaConfig) -> Result<(), SolverError> {
        for population_size in [100, 500, 1000] {
            // elite scales with the population, as in the historical runs
            let config = GaConfig {
                population_size,
                elite_size: population_size / 10,
                tournament_size: base.tournament_size.min(population_size),
                ..base.clone()
            };
            self.run_repeated(&format!("population-{}", population_size), &config)?;
        }
        for mutation_probability in [0.01, 0.1, 0.4] {
            let config = GaConfig {
                mutation_probability,
                ..base.clone()
            };
            self.run_repeated(&format!("mutation-prob-{}", mutation_probability), &config)?;
        }
        for crossover_probability in [0.4, 0.7, 0.9] {
            let config = GaConfig {
                crossover_probability,
                ..base.clone()
            };
            self.run_repeated(&format!("crossover-prob-{}", crossover_probability), &config)?;
        }
        for generations in [300, 1500, 3000] {
            let config = GaConfig {
                stop_condition: StopCondition::Generations(generations),
                ..base.clone()
            };
            self.run_repeated(&format!("generations-{}", generations), &config)?;
        }
        Ok(())
    }

    /// Export all collected overview rows to a CSV file.
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), SolverError> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);
        for row in &self.results {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{EdgeWeightType, Node};

    fn unit_square() -> DistanceMatrix {
        let nodes = vec![
            Node::new(0, 0.0, 0.0),
            Node::new(1, 0.0, 1.0),
            Node::new(2, 1.0, 1.0),
            Node::new(3, 1.0, 0.0),
        ];
        DistanceMatrix::from_nodes(&nodes, EdgeWeightType::Euc2d).unwrap()
    }

    fn tiny_config() -> GaConfig {
        GaConfig {
            population_size: 8,
            elite_size: 1,
            tournament_size: 2,
            stop_condition: StopCondition::Generations(3),
            ..Default::default()
        }
    }

    #[test]
    fn test_summarize_statistics() {
        let tours = vec![
            Tour {
                nodes: vec![0, 1, 2, 3],
                cost: 4.0,
            },
            Tour {
                nodes: vec![0, 2, 1, 3],
                cost: 6.0,
            },
        ];

        let overview = summarize("test", &tours);
        assert_eq!(overview.runs, 2);
        assert_eq!(overview.best, 4.0);
        assert_eq!(overview.worst, 6.0);
        assert_eq!(overview.avg, 5.0);
        assert_eq!(overview.std_dev, 1.0);
    }

    #[test]
    fn test_repeated_runs_aggregate() {
        let matrix = unit_square();
        let mut suite = ExperimentSuite::new(&matrix, 4);
        suite.run_repeated("genetic", &tiny_config()).unwrap();

        let results = suite.results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].runs, 4);
        assert!(results[0].best >= 4.0);
    }

    #[test]
    fn test_strategy_sweep_covers_all_axes() {
        let matrix = unit_square();
        let mut suite = ExperimentSuite::new(&matrix, 2);
        suite.sweep_strategies(&tiny_config()).unwrap();

        let labels: Vec<&str> = suite.results().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "init-greedy",
                "init-random",
                "select-tournament",
                "select-roulette",
                "crossover-ox",
                "crossover-pmx",
                "mutation-swap",
                "mutation-inverse",
            ]
        );
    }

    #[test]
    fn test_export_csv_round_trip() {
        let matrix = unit_square();
        let mut suite = ExperimentSuite::new(&matrix, 2);
        suite.run_repeated("genetic", &tiny_config()).unwrap();

        let path = std::env::temp_dir().join(format!("ga-tsp-overview-{}.csv", std::process::id()));
        suite.export_csv(&path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<RunOverview> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "genetic");
    }
}
