//! Genetic algorithm: operator library and generational engine.

pub mod engine;
pub mod operators;

pub use engine::{GaConfig, GenerationRecord, GeneticEngine, StopCondition};
pub use operators::{CrossoverType, InitializationType, MutationType, SelectionType};
