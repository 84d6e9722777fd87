//! Generational engine.
//!
//! Drives the evolutionary loop over a population of tours: sort, record
//! metrics, carry the elite, breed via the configured operators, and stop on
//! either a generation count or an evaluation budget. Each engine value owns
//! a private seeded generator, so a run is reproducible and never shares
//! mutable state with concurrent runs.

use std::fs::File;
use std::path::Path;

use ordered_float::OrderedFloat;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::SolverError;
use crate::ga::operators::{
    self, CrossoverType, InitializationType, MutationType, SelectionType,
};
use crate::instance::DistanceMatrix;
use crate::tour::Tour;

/// Stopping criterion; exactly one is active per configuration.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum StopCondition {
    /// Run a fixed number of generations.
    Generations(usize),
    /// Cap the number of evaluated individuals (initial members, crossover
    /// children and completed mutations all count).
    Evaluations(usize),
}

/// Genetic algorithm configuration, validated before any run starts and
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaConfig {
    /// Population initialization strategy
    pub initialization: InitializationType,
    /// Parent selection strategy
    pub selection: SelectionType,
    /// Recombination strategy
    pub crossover: CrossoverType,
    /// Mutation strategy
    pub mutation: MutationType,
    /// Probability of recombining a selected pair
    pub crossover_probability: f64,
    /// Probability of mutating each produced child
    pub mutation_probability: f64,
    /// Number of tours per generation
    pub population_size: usize,
    /// Number of best tours carried over unchanged
    pub elite_size: usize,
    /// Candidates per tournament draw
    pub tournament_size: usize,
    /// Stopping criterion
    pub stop_condition: StopCondition,
    /// Seed for the run's private generator
    pub seed: u64,
}

impl Default for GaConfig {
    fn default() -> Self {
        GaConfig {
            initialization: InitializationType::Greedy,
            selection: SelectionType::Tournament,
            crossover: CrossoverType::Ox,
            mutation: MutationType::Swap,
            crossover_probability: 0.5,
            mutation_probability: 0.5,
            population_size: 1000,
            elite_size: 3,
            tournament_size: 5,
            stop_condition: StopCondition::Generations(3000),
            seed: 42,
        }
    }
}

impl GaConfig {
    /// Check parameter combinations. Called once at engine construction;
    /// a run never fails on configuration afterwards.
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.population_size < 1 {
            return Err(SolverError::Config(
                "population_size must be at least 1".to_string(),
            ));
        }
        if self.elite_size > self.population_size {
            return Err(SolverError::Config(format!(
                "elite_size {} exceeds population_size {}",
                self.elite_size, self.population_size
            )));
        }
        if self.tournament_size < 1 || self.tournament_size > self.population_size {
            return Err(SolverError::Config(format!(
                "tournament_size {} must be in [1, {}]",
                self.tournament_size, self.population_size
            )));
        }
        if !(0.0..=1.0).contains(&self.crossover_probability) {
            return Err(SolverError::Config(format!(
                "crossover_probability {} must be in [0, 1]",
                self.crossover_probability
            )));
        }
        if !(0.0..=1.0).contains(&self.mutation_probability) {
            return Err(SolverError::Config(format!(
                "mutation_probability {} must be in [0, 1]",
                self.mutation_probability
            )));
        }
        match self.stop_condition {
            StopCondition::Generations(limit) | StopCondition::Evaluations(limit) => {
                if limit < 1 {
                    return Err(SolverError::Config(
                        "stop condition limit must be at least 1".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// One row of the per-generation metrics stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Generation index, starting at 1
    pub generation: usize,
    /// Lowest cost in the sorted population
    pub best: f64,
    /// Highest cost in the sorted population
    pub worst: f64,
    /// Mean cost over the population
    pub avg: f64,
}

type MetricsSink = csv::Writer<File>;

/// Evolutionary solver for one problem instance.
///
/// The engine borrows the distance matrix read-only, so many engines may run
/// concurrently against the same instance; population, best-so-far and the
/// random stream are private per engine.
#[derive(Debug)]
pub struct GeneticEngine<'a> {
    config: GaConfig,
    matrix: &'a DistanceMatrix,
    rng: ChaCha8Rng,
    population: Vec<Tour>,
    best: Option<Tour>,
    generation: usize,
    evaluations: usize,
}

impl<'a> GeneticEngine<'a> {
    /// Create an engine, rejecting invalid configurations up front.
    pub fn new(matrix: &'a DistanceMatrix, config: GaConfig) -> Result<Self, SolverError> {
        config.validate()?;
        // Interval draws need two distinct positions to terminate.
        if matrix.size() < 2 {
            return Err(SolverError::InvalidInput(format!(
                "instance must have at least 2 cities, got {}",
                matrix.size()
            )));
        }
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(GeneticEngine {
            config,
            matrix,
            rng,
            population: Vec::new(),
            best: None,
            generation: 0,
            evaluations: 0,
        })
    }

    /// Run to completion without metrics.
    pub fn run(&mut self) -> Result<Tour, SolverError> {
        self.execute(None)
    }

    /// Run to completion, streaming one CSV record per generation. Failure
    /// to open or write the sink aborts this run.
    pub fn run_with_metrics<P: AsRef<Path>>(&mut self, path: P) -> Result<Tour, SolverError> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);
        let best = self.execute(Some(&mut writer))?;
        writer.flush()?;
        Ok(best)
    }

    fn execute(&mut self, mut sink: Option<&mut MetricsSink>) -> Result<Tour, SolverError> {
        self.initialize();
        if self.budget_exhausted() {
            return self.best_tour();
        }

        loop {
            if let StopCondition::Generations(limit) = self.config.stop_condition {
                if self.generation >= limit {
                    break;
                }
            }
            let exhausted = self.evolve(sink.as_mut().map(|w| &mut **w))?;
            if exhausted {
                break;
            }
        }

        self.best_tour()
    }

    /// Build generation zero and seed the best-so-far from it.
    fn initialize(&mut self) {
        self.population = operators::initialize(
            self.config.initialization,
            self.matrix,
            self.config.population_size,
            &mut self.rng,
        );
        self.evaluations += self.population.len();
        self.best = self
            .population
            .iter()
            .min_by_key(|t| OrderedFloat(t.cost))
            .cloned();
    }

    /// Advance one generation. Returns `true` when the evaluation budget was
    /// reached, possibly mid-breeding; the partial next generation is then
    /// discarded and the caller returns the best-so-far.
    fn evolve(&mut self, sink: Option<&mut MetricsSink>) -> Result<bool, SolverError> {
        self.generation += 1;
        self.population.sort_by_key(|t| OrderedFloat(t.cost));

        if let Some(first) = self.population.first() {
            let improved = self.best.as_ref().map_or(true, |b| first.cost < b.cost);
            if improved {
                self.best = Some(first.clone());
            }
        }

        if let Some(writer) = sink {
            let total: f64 = self.population.iter().map(|t| t.cost).sum();
            writer.serialize(GenerationRecord {
                generation: self.generation,
                best: self.population[0].cost,
                worst: self.population[self.population.len() - 1].cost,
                avg: total / self.population.len() as f64,
            })?;
        }

        let mut next = Vec::with_capacity(self.config.population_size);
        for elite in self.population.iter().take(self.config.elite_size) {
            next.push(elite.clone());
        }

        while next.len() < self.config.population_size {
            let parent1 = operators::select(
                self.config.selection,
                &self.population,
                self.config.tournament_size,
                &mut self.rng,
            );
            let parent2 = operators::select(
                self.config.selection,
                &self.population,
                self.config.tournament_size,
                &mut self.rng,
            );

            let children = if self.rng.gen::<f64>() < self.config.crossover_probability {
                let children = operators::crossover(
                    self.config.crossover,
                    parent1,
                    parent2,
                    self.matrix,
                    &mut self.rng,
                );
                self.evaluations += children.len();
                if self.budget_exhausted() {
                    return Ok(true);
                }
                children
            } else {
                vec![parent1.clone()]
            };

            for mut child in children {
                if self.rng.gen::<f64>() < self.config.mutation_probability {
                    operators::mutate(self.config.mutation, &mut child, self.matrix, &mut self.rng);
                    self.evaluations += 1;
                    if self.budget_exhausted() {
                        return Ok(true);
                    }
                }
                next.push(child);
            }
        }

        // a two-child crossover can overshoot by one
        next.truncate(self.config.population_size);
        self.population = next;
        Ok(false)
    }

    fn budget_exhausted(&self) -> bool {
        match self.config.stop_condition {
            StopCondition::Evaluations(limit) => self.evaluations >= limit,
            StopCondition::Generations(_) => false,
        }
    }

    fn best_tour(&self) -> Result<Tour, SolverError> {
        match &self.best {
            Some(best) => Ok(best.clone()),
            // population_size >= 1 is validated, so initialize always sets it
            None => unreachable!("engine ran without an initialized population"),
        }
    }

    /// Generations completed so far.
    pub fn current_generation(&self) -> usize {
        self.generation
    }

    /// Individuals evaluated so far.
    pub fn evaluation_count(&self) -> usize {
        self.evaluations
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

    fn small_config() -> GaConfig {
        GaConfig {
            population_size: 12,
            elite_size: 2,
            tournament_size: 3,
            crossover_probability: 0.8,
            mutation_probability: 0.3,
            stop_condition: StopCondition::Generations(20),
            ..Default::default()
        }
    }

    #[test]
    fn test_config_validation() {
        let matrix = unit_square();

        let ok = small_config();
        assert!(GeneticEngine::new(&matrix, ok).is_ok());

        let mut bad = small_config();
        bad.population_size = 0;
        assert!(GeneticEngine::new(&matrix, bad).is_err());

        let mut bad = small_config();
        bad.elite_size = 13;
        assert!(GeneticEngine::new(&matrix, bad).is_err());

        let mut bad = small_config();
        bad.tournament_size = 0;
        assert!(GeneticEngine::new(&matrix, bad).is_err());

        let mut bad = small_config();
        bad.tournament_size = 13;
        assert!(GeneticEngine::new(&matrix, bad).is_err());

        let mut bad = small_config();
        bad.crossover_probability = 1.5;
        assert!(GeneticEngine::new(&matrix, bad).is_err());

        let mut bad = small_config();
        bad.mutation_probability = -0.1;
        assert!(GeneticEngine::new(&matrix, bad).is_err());

        let mut bad = small_config();
        bad.stop_condition = StopCondition::Evaluations(0);
        assert!(GeneticEngine::new(&matrix, bad).is_err());
    }

    #[test]
    fn test_single_city_instance_is_rejected() {
        // A 1-city matrix passes shape validation but no interval can be
        // drawn over it; the engine must refuse it instead of spinning.
        let matrix = DistanceMatrix::new(vec![vec![0.0]]).unwrap();
        let err = GeneticEngine::new(&matrix, small_config()).unwrap_err();
        assert!(matches!(err, SolverError::InvalidInput(_)));
    }

    #[test]
    fn test_run_finds_the_square_optimum() {
        let matrix = unit_square();
        let mut engine = GeneticEngine::new(&matrix, small_config()).unwrap();
        let best = engine.run().unwrap();

        assert!(best.is_permutation_of(4));
        assert_eq!(best.cost, 4.0);
        assert_eq!(engine.current_generation(), 20);
    }

    #[test]
    fn test_runs_are_reproducible_per_seed() {
        let matrix = unit_square();
        let config = GaConfig {
            initialization: InitializationType::Random,
            seed: 7,
            ..small_config()
        };

        let mut first = GeneticEngine::new(&matrix, config.clone()).unwrap();
        let mut second = GeneticEngine::new(&matrix, config).unwrap();
        let a = first.run().unwrap();
        let b = second.run().unwrap();
        assert_eq!(a.nodes, b.nodes);
        assert_eq!(a.cost, b.cost);
    }

    #[test]
    fn test_evaluation_budget_stops_after_init() {
        let matrix = unit_square();
        let config = GaConfig {
            stop_condition: StopCondition::Evaluations(12),
            ..small_config()
        };

        let mut engine = GeneticEngine::new(&matrix, config).unwrap();
        let best = engine.run().unwrap();

        assert_eq!(engine.current_generation(), 0);
        assert_eq!(engine.evaluation_count(), 12);
        assert!(best.is_permutation_of(4));
    }

    #[test]
    fn test_evaluation_budget_returns_mid_generation() {
        let matrix = unit_square();
        let config = GaConfig {
            initialization: InitializationType::Random,
            crossover_probability: 1.0,
            mutation_probability: 1.0,
            stop_condition: StopCondition::Evaluations(15),
            ..small_config()
        };

        let mut engine = GeneticEngine::new(&matrix, config).unwrap();
        let best = engine.run().unwrap();

        assert_eq!(engine.current_generation(), 1);
        assert!(engine.evaluation_count() >= 15);
        assert!(best.is_permutation_of(4));
    }

    #[test]
    fn test_elite_costs_survive_one_generation() {
        let matrix = unit_square();
        let config = GaConfig {
            initialization: InitializationType::Random,
            elite_size: 4,
            ..small_config()
        };

        let mut engine = GeneticEngine::new(&matrix, config).unwrap();
        engine.initialize();

        let mut sorted_costs: Vec<f64> = engine.population.iter().map(|t| t.cost).collect();
        sorted_costs.sort_by_key(|&c| OrderedFloat(c));

        engine.evolve(None).unwrap();

        for &cost in sorted_costs.iter().take(4) {
            assert!(
                engine.population.iter().any(|t| t.cost == cost),
                "elite cost {} missing from the next generation",
                cost
            );
        }
        assert_eq!(engine.population.len(), 12);
    }

    #[test]
    fn test_metrics_stream_has_one_row_per_generation() {
        let matrix = unit_square();
        let config = GaConfig {
            stop_condition: StopCondition::Generations(5),
            ..small_config()
        };

        let path = std::env::temp_dir().join(format!(
            "ga-tsp-metrics-{}-{}.csv",
            std::process::id(),
            7u32
        ));
        let mut engine = GeneticEngine::new(&matrix, config).unwrap();
        engine.run_with_metrics(&path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let records: Vec<GenerationRecord> =
            reader.deserialize().collect::<Result<_, _>>().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(records.len(), 5);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.generation, i + 1);
            assert!(record.best <= record.avg && record.avg <= record.worst);
        }
    }

    #[test]
    fn test_metrics_sink_failure_aborts_the_run() {
        let matrix = unit_square();
        let mut engine = GeneticEngine::new(&matrix, small_config()).unwrap();
        let result = engine.run_with_metrics("/nonexistent-dir/metrics.csv");
        assert!(result.is_err());
    }
}
