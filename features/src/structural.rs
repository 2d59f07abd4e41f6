//! Local structure around a node: triangles, density, coreness and two-hop reach.
//!
//! All functions read through a [`GraphView`] and treat neighbor ids that do
//! not resolve to a stored node as absent rather than as errors.

use hawkeye_core::model::Node;
use std::collections::HashSet;
use storage::GraphView;

/// Upper bound of the coreness heuristic.
pub const CORENESS_CAP: u64 = 10;

/// Triangle density around `node`.
///
/// Every index pair `i < j` of the neighbor list is tested, so duplicate
/// entries add pairs. A pair counts when neighbor `j` appears in neighbor
/// `i`'s own neighbor list. The denominator uses the incidence degree, which
/// can exceed the number of enumerated pairs, so values are not always a
/// textbook clustering coefficient.
///
/// Cost is O(d³) for a node with d neighbors.
pub fn clustering_coefficient(view: &GraphView<'_>, node: &Node) -> f32 {
    if node.degree < 2 {
        return 0.0;
    }

    let neighbors = &node.neighbors;
    let mut triangles: u64 = 0;
    for (i, first) in neighbors.iter().enumerate() {
        let Some(first) = view.get(first) else {
            continue;
        };
        triangles += neighbors[i + 1..]
            .iter()
            .filter(|second| first.has_neighbor(second))
            .count() as u64;
    }

    let max_triangles = node.degree * (node.degree - 1) / 2;
    if max_triangles > 0 {
        triangles as f32 / max_triangles as f32
    } else {
        0.0
    }
}

/// Stand-in for a k-core number: the degree capped at [`CORENESS_CAP`].
pub fn coreness_estimate(node: &Node) -> f32 {
    node.degree.min(CORENESS_CAP) as f32
}

/// Summed neighbor degree over `n * (n - 1)`, where `n` is the length of the
/// neighbor list including entries that do not resolve.
pub fn local_density(view: &GraphView<'_>, node: &Node) -> f32 {
    let n = node.neighbors.len() as u64;
    if n <= 1 {
        return 0.0;
    }

    let edges: u64 = node
        .neighbors
        .iter()
        .filter_map(|id| view.get(id))
        .map(|neighbor| neighbor.degree)
        .sum();

    edges as f32 / (n * (n - 1)) as f32
}

/// Distinct ids two hops out, not counting `node` itself.
pub fn two_hop_count(view: &GraphView<'_>, node: &Node) -> usize {
    let mut reached: HashSet<&str> = HashSet::new();
    for neighbor in node.neighbors.iter().filter_map(|id| view.get(id)) {
        for second in &neighbor.neighbors {
            if second != node.id() {
                reached.insert(second.as_str());
            }
        }
    }
    reached.len()
}
