//! Genetic operators on tours.
//!
//! Initialization, selection, crossover and mutation strategies, each
//! dispatched through a closed enum bound once at configuration time. The
//! crossovers guarantee a valid permutation for any interval and any valid
//! parents; that property is what the tests in this module pin down.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::instance::DistanceMatrix;
use crate::random::{random_excluding, Interval};
use crate::tour::Tour;

/// Population initialization strategy.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum InitializationType {
    /// Nearest-neighbor tour from a uniformly random start city.
    Greedy,
    /// Uniformly random city drawn by rejection against the used set.
    Random,
}

/// Parent selection strategy.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum SelectionType {
    /// Sample `tournament_size` distinct members, keep the cheapest.
    Tournament,
    /// Cost-weighted wheel draw over the whole population.
    Roulette,
}

/// Recombination strategy.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum CrossoverType {
    /// Order crossover, one child.
    Ox,
    /// Partial-mapped crossover, two children.
    Pmx,
}

/// Mutation strategy.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum MutationType {
    /// Exchange the cities at two random positions.
    Swap,
    /// Reverse a random contiguous subsequence.
    Inverse,
}

/// Build an initial population of `size` tours.
pub fn initialize<R: Rng>(
    init_type: InitializationType,
    matrix: &DistanceMatrix,
    size: usize,
    rng: &mut R,
) -> Vec<Tour> {
    let mut population = Vec::with_capacity(size);
    while population.len() < size {
        population.push(match init_type {
            InitializationType::Greedy => greedy_tour(matrix, rng),
            InitializationType::Random => random_tour(matrix, rng),
        });
    }
    population
}

/// Random permutation built by repeatedly drawing a not-yet-used city.
pub fn random_tour<R: Rng>(matrix: &DistanceMatrix, rng: &mut R) -> Tour {
    let n = matrix.size();
    let mut used = vec![false; n];
    let mut nodes = Vec::with_capacity(n);
    while nodes.len() < n {
        let city = random_excluding(rng, n, &used);
        used[city] = true;
        nodes.push(city);
    }
    Tour::new(nodes, matrix)
}

/// Nearest-neighbor tour from a uniformly random start city.
pub fn greedy_tour<R: Rng>(matrix: &DistanceMatrix, rng: &mut R) -> Tour {
    let start = rng.gen_range(0..matrix.size());
    greedy_tour_from(matrix, start)
}

/// Nearest-neighbor tour from a fixed start city.
pub fn greedy_tour_from(matrix: &DistanceMatrix, start: usize) -> Tour {
    let n = matrix.size();
    let mut used = vec![false; n];
    let mut nodes = Vec::with_capacity(n);
    used[start] = true;
    nodes.push(start);

    let mut current = start;
    while let Some(next) = matrix.nearest_unvisited(current, &used) {
        used[next] = true;
        nodes.push(next);
        current = next;
    }
    Tour::new(nodes, matrix)
}

/// Select one parent from a population.
pub fn select<'a, R: Rng>(
    sel_type: SelectionType,
    population: &'a [Tour],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Tour {
    match sel_type {
        SelectionType::Tournament => tournament_selection(population, tournament_size, rng),
        SelectionType::Roulette => roulette_selection(population, rng),
    }
}

/// Pick `tournament_size` distinct population positions by rejection
/// sampling and return the cheapest candidate.
fn tournament_selection<'a, R: Rng>(
    population: &'a [Tour],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Tour {
    let mut used = vec![false; population.len()];
    let mut best: Option<&Tour> = None;

    for _ in 0..tournament_size {
        let position = random_excluding(rng, population.len(), &used);
        used[position] = true;
        let candidate = &population[position];
        if best.map_or(true, |b| candidate.cost < b.cost) {
            best = Some(candidate);
        }
    }
    // tournament_size >= 1 is validated at configuration time
    best.unwrap_or(&population[0])
}

/// Wheel draw over `[0, 1]` with one slice per member in population order.
///
/// Slice width is proportional to the member's raw cost, so longer tours
/// occupy more of the wheel. Bounds are inclusive on both ends and the first
/// matching slice wins.
fn roulette_selection<'a, R: Rng>(population: &'a [Tour], rng: &mut R) -> &'a Tour {
    let total: f64 = population.iter().map(|t| t.cost).sum();
    let pick: f64 = rng.gen();

    let mut start = 0.0;
    for tour in population {
        let width = tour.cost / total;
        if pick >= start && pick <= start + width {
            return tour;
        }
        start += width;
    }
    // rounding can leave the draw past the last slice end
    &population[population.len() - 1]
}

/// Recombine two parents, yielding one (OX) or two (PMX) children with
/// freshly computed costs.
pub fn crossover<R: Rng>(
    cross_type: CrossoverType,
    parent1: &Tour,
    parent2: &Tour,
    matrix: &DistanceMatrix,
    rng: &mut R,
) -> Vec<Tour> {
    match cross_type {
        CrossoverType::Ox => ox_crossover(parent1, parent2, matrix, rng),
        CrossoverType::Pmx => pmx_crossover(parent1, parent2, matrix, rng),
    }
}

/// Order crossover: keep parent-1's segment in place, fill the remaining
/// positions with parent-2's other cities in parent-2 order.
fn ox_crossover<R: Rng>(
    parent1: &Tour,
    parent2: &Tour,
    matrix: &DistanceMatrix,
    rng: &mut R,
) -> Vec<Tour> {
    let n = matrix.size();
    let interval = Interval::random(rng, n);

    let segment = &parent1.nodes[interval.lo..=interval.hi];
    let mut in_segment = vec![false; n];
    for &city in segment {
        in_segment[city] = true;
    }

    let rest: Vec<usize> = parent2
        .nodes
        .iter()
        .copied()
        .filter(|&city| !in_segment[city])
        .collect();

    let mut child = Vec::with_capacity(n);
    child.extend_from_slice(&rest[..interval.lo]);
    child.extend_from_slice(segment);
    child.extend_from_slice(&rest[interval.lo..]);

    vec![Tour::new(child, matrix)]
}

/// Partial-mapped crossover: both children take the other parent's segment
/// and resolve duplicates outside it by walking the segment mapping.
fn pmx_crossover<R: Rng>(
    parent1: &Tour,
    parent2: &Tour,
    matrix: &DistanceMatrix,
    rng: &mut R,
) -> Vec<Tour> {
    let n = matrix.size();
    let interval = Interval::random(rng, n);

    // city-indexed mapping tables over the matched segment
    let mut map_one_two = vec![usize::MAX; n];
    let mut map_two_one = vec![usize::MAX; n];
    for i in interval.lo..=interval.hi {
        map_one_two[parent1.nodes[i]] = parent2.nodes[i];
        map_two_one[parent2.nodes[i]] = parent1.nodes[i];
    }

    let child1 = pmx_child(&parent1.nodes, &parent2.nodes, &map_two_one, interval);
    let child2 = pmx_child(&parent2.nodes, &parent1.nodes, &map_one_two, interval);

    vec![Tour::new(child1, matrix), Tour::new(child2, matrix)]
}

/// Build one PMX child: `other`'s segment inside the interval, `base`'s
/// cities outside it, chained through `mapping` until conflict-free.
fn pmx_child(base: &[usize], other: &[usize], mapping: &[usize], interval: Interval) -> Vec<usize> {
    let mut child = Vec::with_capacity(base.len());
    for i in 0..base.len() {
        if interval.contains(i) {
            child.push(other[i]);
        } else {
            child.push(resolve_mapping(mapping, base[i]));
        }
    }
    child
}

/// Follow the mapping chain from `city` until an unmapped value is reached.
/// Valid permutation parents terminate within the segment length; the bound
/// turns a corrupted mapping into a loud failure instead of a hang.
fn resolve_mapping(mapping: &[usize], city: usize) -> usize {
    let mut value = city;
    for _ in 0..=mapping.len() {
        match mapping[value] {
            usize::MAX => return value,
            next => value = next,
        }
    }
    unreachable!("PMX mapping chain did not terminate for city {}", city)
}

/// Mutate a tour in place and refresh its cached cost.
pub fn mutate<R: Rng>(
    mut_type: MutationType,
    tour: &mut Tour,
    matrix: &DistanceMatrix,
    rng: &mut R,
) {
    let interval = Interval::random(rng, matrix.size());
    match mut_type {
        MutationType::Swap => tour.nodes.swap(interval.lo, interval.hi),
        MutationType::Inverse => tour.nodes[interval.lo..=interval.hi].reverse(),
    }
    tour.update_cost(matrix);
}
