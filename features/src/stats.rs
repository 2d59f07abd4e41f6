//! Neighbor-degree statistics.
//!
//! The reduction keeps `LANES` independent accumulators for sum, min and max
//! and walks the input in fixed-width chunks, which the compiler turns into
//! packed SIMD arithmetic. The tail that does not fill a chunk is folded in
//! scalarly. A plain two-pass [`scalar_reduce`] computes the same statistics
//! and serves as the reference the lane version is checked against.

use hawkeye_core::model::Node;
use storage::GraphView;

/// Lane width used by feature extraction.
pub const DEFAULT_LANES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NeighborDegreeStats {
    pub mean: f32,
    pub stddev: f32,
    pub max: f32,
    pub min: f32,
}

impl NeighborDegreeStats {
    pub fn to_array(self) -> [f32; 4] {
        [self.mean, self.stddev, self.max, self.min]
    }
}

/// Degrees of every neighbor-list entry that resolves to a stored node.
pub fn neighbor_degrees(view: &GraphView<'_>, node: &Node) -> Vec<f32> {
    node.neighbors
        .iter()
        .filter_map(|id| view.get(id))
        .map(|neighbor| neighbor.degree as f32)
        .collect()
}

pub fn neighbor_degree_stats(view: &GraphView<'_>, node: &Node) -> NeighborDegreeStats {
    if node.neighbors.is_empty() {
        return NeighborDegreeStats::default();
    }
    lane_reduce::<DEFAULT_LANES>(&neighbor_degrees(view, node))
}

/// Mean, population standard deviation, max and min of `values`.
///
/// Returns all zeros for an empty slice. `LANES == 0` falls back to
/// [`scalar_reduce`].
pub fn lane_reduce<const LANES: usize>(values: &[f32]) -> NeighborDegreeStats {
    if values.is_empty() {
        return NeighborDegreeStats::default();
    }
    if LANES == 0 {
        return scalar_reduce(values);
    }

    let chunks = values.chunks_exact(LANES);
    let tail = chunks.remainder();

    let mut sum_lanes = [0.0f32; LANES];
    let mut max_lanes = [f32::NEG_INFINITY; LANES];
    let mut min_lanes = [f32::INFINITY; LANES];
    for chunk in chunks.clone() {
        for lane in 0..LANES {
            let v = chunk[lane];
            sum_lanes[lane] += v;
            max_lanes[lane] = max_lanes[lane].max(v);
            min_lanes[lane] = min_lanes[lane].min(v);
        }
    }

    let mut sum: f32 = sum_lanes.iter().sum();
    let mut max = max_lanes.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut min = min_lanes.iter().copied().fold(f32::INFINITY, f32::min);
    for &v in tail {
        sum += v;
        max = max.max(v);
        min = min.min(v);
    }

    let n = values.len() as f32;
    let mean = sum / n;

    let mut sq_lanes = [0.0f32; LANES];
    for chunk in chunks {
        for lane in 0..LANES {
            let diff = chunk[lane] - mean;
            sq_lanes[lane] += diff * diff;
        }
    }
    let mut sq_sum: f32 = sq_lanes.iter().sum();
    for &v in tail {
        let diff = v - mean;
        sq_sum += diff * diff;
    }

    NeighborDegreeStats {
        mean,
        stddev: (sq_sum / n).sqrt(),
        max,
        min,
    }
}

/// Two-pass scalar reference for [`lane_reduce`].
pub fn scalar_reduce(values: &[f32]) -> NeighborDegreeStats {
    if values.is_empty() {
        return NeighborDegreeStats::default();
    }

    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / n;
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let min = values.iter().copied().fold(f32::INFINITY, f32::min);

    NeighborDegreeStats {
        mean,
        stddev: variance.sqrt(),
        max,
        min,
    }
}
