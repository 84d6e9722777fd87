//! Tour representation.
//!
//! A tour is a permutation of all city indices together with a cached total
//! length. Operators that rearrange the node sequence are responsible for
//! recomputing the cost before the tour is ranked or returned.

use serde::{Deserialize, Serialize};

use crate::instance::DistanceMatrix;

/// A closed tour: an ordering of every city exactly once, plus its cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tour {
    /// City indices in visiting order
    pub nodes: Vec<usize>,
    /// Cached total length under the instance's distance matrix
    pub cost: f64,
}

impl Tour {
    /// Build a tour from a node sequence, computing its cost.
    pub fn new(nodes: Vec<usize>, matrix: &DistanceMatrix) -> Self {
        let cost = matrix.tour_cost(&nodes);
        Tour { nodes, cost }
    }

    /// Refresh the cached cost after the node sequence changed.
    pub fn update_cost(&mut self, matrix: &DistanceMatrix) {
        self.cost = matrix.tour_cost(&self.nodes);
    }

    /// Number of cities in the tour.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the node sequence is a permutation of `[0, n)`.
    pub fn is_permutation_of(&self, n: usize) -> bool {
        if self.nodes.len() != n {
            return false;
        }
        let mut seen = vec![false; n];
        for &node in &self.nodes {
            if node >= n || seen[node] {
                return false;
            }
            seen[node] = true;
        }
        true
    }
}

impl std::fmt::Display for Tour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tour ( cost = {}, nodes = {:?} )", self.cost, self.nodes)
    }
}
