//! Parsing and representation of TSP instances.
//!
//! Handles TSPLIB-format files with EUC_2D or GEO edge weights and builds the
//! precomputed distance matrix the solver works on. Distances reproduce the
//! TSPLIB rounding conventions exactly so costs are comparable with published
//! optima for benchmark instances.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SolverError;

/// Mean Earth radius used by TSPLIB for GEO instances, in kilometers.
const EARTH_RADIUS: f64 = 6378.388;

/// TSPLIB nearest-integer rounding (half rounds up).
fn nint(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Edge weight function of an instance.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum EdgeWeightType {
    /// Planar Euclidean distance, rounded to the nearest integer.
    Euc2d,
    /// Geographical distance on the TSPLIB sphere.
    Geo,
}

/// A city with a fixed index and immutable coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Node {
    /// Node identifier (1-indexed in files, 0-indexed internally)
    pub id: usize,
    /// X coordinate (latitude for GEO instances)
    pub x: f64,
    /// Y coordinate (longitude for GEO instances)
    pub y: f64,
}

impl Node {
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        Node { id, x, y }
    }

    /// Distance to another node under the given edge weight function.
    pub fn distance(&self, other: &Node, format: EdgeWeightType) -> f64 {
        match format {
            EdgeWeightType::Euc2d => {
                let dx = self.x - other.x;
                let dy = self.y - other.y;
                nint((dx * dx + dy * dy).sqrt())
            }
            EdgeWeightType::Geo => {
                let q1 = (self.longitude() - other.longitude()).cos();
                let q2 = (self.latitude() - other.latitude()).cos();
                let q3 = (self.latitude() + other.latitude()).cos();
                let arc = 0.5 * ((1.0 + q1) * q2 - (1.0 - q1) * q3);
                (EARTH_RADIUS * arc.acos() + 1.0).trunc()
            }
        }
    }

    /// Latitude in radians; the coordinate encodes degrees.minutes.
    fn latitude(&self) -> f64 {
        let deg = nint(self.x);
        let min = self.x - deg;
        std::f64::consts::PI * (deg + 5.0 * min / 3.0) / 180.0
    }

    /// Longitude in radians; the coordinate encodes degrees.minutes.
    fn longitude(&self) -> f64 {
        let deg = nint(self.y);
        let min = self.y - deg;
        std::f64::consts::PI * (deg + 5.0 * min / 3.0) / 180.0
    }
}

/// Precomputed pairwise distances for a fixed set of cities.
///
/// Immutable after construction: concurrent runs against the same instance
/// share it read-only.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    values: Vec<Vec<f64>>,
    size: usize,
}

impl DistanceMatrix {
    /// Build a matrix from raw rows, rejecting empty or non-square input.
    pub fn new(values: Vec<Vec<f64>>) -> Result<Self, SolverError> {
        let size = values.len();
        if size == 0 {
            return Err(SolverError::InvalidInput(
                "distance matrix must contain at least one node".to_string(),
            ));
        }
        if values.iter().any(|row| row.len() != size) {
            return Err(SolverError::InvalidInput(format!(
                "distance matrix must be square ({} rows)",
                size
            )));
        }
        Ok(DistanceMatrix { values, size })
    }

    /// Compute the full matrix from node coordinates.
    pub fn from_nodes(nodes: &[Node], format: EdgeWeightType) -> Result<Self, SolverError> {
        let n = nodes.len();
        let mut values = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    values[i][j] = nodes[i].distance(&nodes[j], format);
                }
            }
        }
        DistanceMatrix::new(values)
    }

    /// Number of cities.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance between two cities.
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    /// Total length of a closed tour: consecutive edges plus the wraparound
    /// edge from the last city back to the first.
    pub fn tour_cost(&self, nodes: &[usize]) -> f64 {
        if nodes.len() < 2 {
            return 0.0;
        }
        let mut cost = 0.0;
        for i in 0..nodes.len() - 1 {
            cost += self.distance(nodes[i], nodes[i + 1]);
        }
        cost + self.distance(nodes[nodes.len() - 1], nodes[0])
    }

    /// Closest city to `current` among those not yet visited. Strict
    /// less-than comparison, so the lowest index among ties wins. Returns
    /// `None` once every city is visited.
    pub fn nearest_unvisited(&self, current: usize, visited: &[bool]) -> Option<usize> {
        let mut best = None;
        let mut best_dist = f64::MAX;
        for i in 0..self.size {
            if i == current || visited[i] {
                continue;
            }
            let d = self.values[current][i];
            if d < best_dist {
                best_dist = d;
                best = Some(i);
            }
        }
        best
    }
}

/// A parsed TSPLIB instance together with its distance matrix.
#[derive(Debug, Clone)]
pub struct TspInstance {
    /// Name of the instance
    pub name: String,
    /// Number of cities
    pub dimension: usize,
    /// Edge weight function declared by the file
    pub edge_weight_type: EdgeWeightType,
    /// City coordinates in file order
    pub nodes: Vec<Node>,
    /// Precomputed distance matrix
    pub matrix: DistanceMatrix,
}

impl TspInstance {
    /// Parse a TSPLIB format file supporting EUC_2D and GEO edge weights.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SolverError> {
        let file = File::open(&path)?;
        let reader = BufReader::new(file);

        let mut name = String::new();
        let mut format = None;
        let mut nodes: Vec<Node> = Vec::new();
        let mut in_coords = false;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }
            if line == "EOF" {
                break;
            }

            if !in_coords {
                if let Some(value) = line.strip_prefix("NAME") {
                    name = value.trim_start().trim_start_matches(':').trim().to_string();
                    continue;
                }
                if let Some(value) = line.strip_prefix("EDGE_WEIGHT_TYPE") {
                    let value = value.trim_start().trim_start_matches(':').trim();
                    format = Some(match value {
                        "EUC_2D" => EdgeWeightType::Euc2d,
                        "GEO" => EdgeWeightType::Geo,
                        other => {
                            return Err(SolverError::Parse(format!(
                                "unsupported EDGE_WEIGHT_TYPE: {}",
                                other
                            )))
                        }
                    });
                    continue;
                }
                if line.starts_with("NODE_COORD_SECTION") {
                    in_coords = true;
                }
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 3 {
                let x: f64 = parts[1].parse().map_err(|_| {
                    SolverError::Parse(format!("invalid x coordinate: {}", parts[1]))
                })?;
                let y: f64 = parts[2].parse().map_err(|_| {
                    SolverError::Parse(format!("invalid y coordinate: {}", parts[2]))
                })?;
                nodes.push(Node::new(nodes.len(), x, y));
            }
        }

        let format = format
            .ok_or_else(|| SolverError::Parse("missing EDGE_WEIGHT_TYPE header".to_string()))?;
        if nodes.is_empty() {
            return Err(SolverError::Parse("no node coordinates found".to_string()));
        }

        log::info!("Loaded {} nodes ({:?})", nodes.len(), format);

        let matrix = DistanceMatrix::from_nodes(&nodes, format)?;
        Ok(TspInstance {
            name,
            dimension: nodes.len(),
            edge_weight_type: format,
            nodes,
            matrix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_rounding() {
        let a = Node::new(0, 0.0, 0.0);
        let b = Node::new(1, 3.0, 4.0);
        assert_eq!(a.distance(&b, EdgeWeightType::Euc2d), 5.0);

        // sqrt(2) = 1.414... rounds down, sqrt(13) = 3.605... rounds up
        let c = Node::new(2, 1.0, 1.0);
        let d = Node::new(3, 3.0, 4.0);
        assert_eq!(a.distance(&c, EdgeWeightType::Euc2d), 1.0);
        assert_eq!(c.distance(&d, EdgeWeightType::Euc2d), 4.0);
    }

    #[test]
    fn test_half_rounds_up() {
        let a = Node::new(0, 0.0, 0.0);
        let b = Node::new(1, 0.0, 2.5);
        assert_eq!(a.distance(&b, EdgeWeightType::Euc2d), 3.0);
    }

    #[test]
    fn test_geo_distance_is_truncated_plus_one() {
        let a = Node::new(0, 52.31, 13.24); // roughly Berlin
        let b = Node::new(1, 48.51, 2.20); // roughly Paris
        let d = a.distance(&b, EdgeWeightType::Geo);
        assert_eq!(d, d.trunc());
        assert!(d > 800.0 && d < 1000.0);
    }

    #[test]
    fn test_matrix_rejects_bad_shapes() {
        assert!(DistanceMatrix::new(Vec::new()).is_err());
        assert!(DistanceMatrix::new(vec![vec![0.0, 1.0], vec![1.0]]).is_err());
        assert!(DistanceMatrix::new(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).is_ok());
    }

    #[test]
    fn test_tour_cost_includes_wraparound() {
        let nodes = vec![
            Node::new(0, 0.0, 0.0),
            Node::new(1, 0.0, 1.0),
            Node::new(2, 1.0, 1.0),
            Node::new(3, 1.0, 0.0),
        ];
        let matrix = DistanceMatrix::from_nodes(&nodes, EdgeWeightType::Euc2d).unwrap();
        assert_eq!(matrix.tour_cost(&[0, 1, 2, 3]), 4.0);
    }

    #[test]
    fn test_nearest_unvisited_prefers_first_on_ties() {
        // nodes 1 and 2 are both at distance 1 from node 0
        let matrix = DistanceMatrix::new(vec![
            vec![0.0, 1.0, 1.0],
            vec![1.0, 0.0, 2.0],
            vec![1.0, 2.0, 0.0],
        ])
        .unwrap();
        let visited = vec![true, false, false];
        assert_eq!(matrix.nearest_unvisited(0, &visited), Some(1));

        let visited = vec![true, true, false];
        assert_eq!(matrix.nearest_unvisited(0, &visited), Some(2));

        let visited = vec![true, true, true];
        assert_eq!(matrix.nearest_unvisited(0, &visited), None);
    }
}
