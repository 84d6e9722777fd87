//! GA-TSP Solver Library
//!
//! A genetic-algorithm solver for the symmetric Traveling Salesman Problem.
//!
//! # Features
//!
//! - TSPLIB instance loading (EUC_2D and GEO edge weights, exact rounding)
//! - Pluggable operators: Greedy/Random initialization, Tournament/Roulette
//!   selection, OX/PMX crossover, Swap/Inverse mutation
//! - Generational engine with elitism, per-generation CSV metrics and a
//!   generation-count or evaluation-budget stop condition
//! - Baseline constructors (nearest-neighbor, random sampling)
//! - A parallel experiment harness for strategy and parameter sweeps
//!
//! # Example
//!
//! ```no_run
//! use ga_tsp_solver::instance::TspInstance;
//! use ga_tsp_solver::ga::{GaConfig, GeneticEngine};
//!
//! // Load instance
//! let instance = TspInstance::from_file("berlin52.tsp").unwrap();
//!
//! // Run the engine with the default configuration
//! let config = GaConfig::default();
//! let mut engine = GeneticEngine::new(&instance.matrix, config).unwrap();
//! let best = engine.run().unwrap();
//!
//! println!("Best tour cost: {:.2}", best.cost);
//! ```

pub mod baseline;
pub mod error;
pub mod experiments;
pub mod ga;
pub mod instance;
pub mod random;
pub mod tour;

pub use error::SolverError;
pub use instance::{DistanceMatrix, TspInstance};
pub use tour::Tour;
