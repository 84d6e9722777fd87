//! Crate-wide error type.

use std::fmt;

/// Errors raised while loading instances, validating configurations or
/// persisting results. Engine runs never fail for algorithmic reasons;
/// every variant here is an input or I/O problem.
#[derive(Debug)]
pub enum SolverError {
    /// Invalid parameter combination, rejected before any run starts.
    Config(String),
    /// Malformed distance data (non-square matrix, empty instance).
    InvalidInput(String),
    /// Unparseable or unsupported TSPLIB content.
    Parse(String),
    /// Metrics or result file could not be opened/written.
    Io(std::io::Error),
    /// CSV serialization failure on a metrics or overview sink.
    Csv(csv::Error),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::Config(msg) => write!(f, "invalid configuration: {}", msg),
            SolverError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            SolverError::Parse(msg) => write!(f, "parse error: {}", msg),
            SolverError::Io(e) => write!(f, "i/o error: {}", e),
            SolverError::Csv(e) => write!(f, "csv error: {}", e),
        }
    }
}

impl std::error::Error for SolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolverError::Io(e) => Some(e),
            SolverError::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SolverError {
    fn from(e: std::io::Error) -> Self {
        SolverError::Io(e)
    }
}

impl From<csv::Error> for SolverError {
    fn from(e: csv::Error) -> Self {
        SolverError::Csv(e)
    }
}
