//! Baseline tour constructors used as comparison points for the GA.

use rand::Rng;

use crate::ga::operators::{greedy_tour_from, random_tour};
use crate::instance::DistanceMatrix;
use crate::tour::Tour;

/// Batch size of the random baseline, matching the historical experiments.
pub const DEFAULT_RANDOM_SAMPLES: usize = 10_000;

/// One nearest-neighbor tour per possible start city, N tours in total.
pub fn greedy_baseline(matrix: &DistanceMatrix) -> Vec<Tour> {
    (0..matrix.size())
        .map(|start| greedy_tour_from(matrix, start))
        .collect()
}

/// A batch of uniformly random tours.
pub fn random_baseline<R: Rng>(matrix: &DistanceMatrix, samples: usize, rng: &mut R) -> Vec<Tour> {
    (0..samples).map(|_| random_tour(matrix, rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

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

    #[test]
    fn test_greedy_baseline_covers_every_start() {
        let matrix = unit_square();
        let tours = greedy_baseline(&matrix);
        assert_eq!(tours.len(), 4);
        for (start, tour) in tours.iter().enumerate() {
            assert_eq!(tour.nodes[0], start);
            assert!(tour.is_permutation_of(4));
            assert_eq!(tour.cost, 4.0);
        }
    }

    #[test]
    fn test_random_baseline_produces_valid_tours() {
        let matrix = unit_square();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let tours = random_baseline(&matrix, 50, &mut rng);
        assert_eq!(tours.len(), 50);
        for tour in tours {
            assert!(tour.is_permutation_of(4));
        }
    }
}
