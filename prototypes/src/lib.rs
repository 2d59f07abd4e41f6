//! Synthetic graphs for benchmarks and load tests.

use storage::{GraphError, GraphStore};
use tracing::info;

/// Id of the `i`-th generated node.
pub fn node_id(i: usize) -> String {
    format!("node_{i}")
}

/// Populate `store` with a chain of `n` nodes.
///
/// Node `i` carries raw features `[i, 2i, i % 100]`. Every node links to its
/// successor, and every tenth node also links ten positions ahead.
pub fn chain_graph(store: &GraphStore, n: usize) -> Result<(), GraphError> {
    for i in 0..n {
        store.add_node(node_id(i), vec![i as f32, (i * 2) as f32, (i % 100) as f32])?;
    }

    for i in 0..n.saturating_sub(1) {
        store.add_edge(&node_id(i), &node_id(i + 1))?;
        if i % 10 == 0 && i + 10 < n {
            store.add_edge(&node_id(i), &node_id(i + 10))?;
        }
    }

    info!(nodes = n, edges = store.edge_count()?, "generated chain graph");
    Ok(())
}

/// Ids `node_0 .. node_{count-1}`.
pub fn node_ids(count: usize) -> Vec<String> {
    (0..count).map(node_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_graph_shape() {
        let store = GraphStore::new();
        chain_graph(&store, 100).unwrap();

        assert_eq!(store.size().unwrap(), 100);
        // 99 successor links plus skips from 0, 10, .., 80
        assert_eq!(store.edge_count().unwrap(), 99 + 9);

        let n10 = store.get_node("node_10").unwrap().unwrap();
        assert_eq!(n10.raw_features, vec![10.0, 20.0, 10.0]);
        assert_eq!(n10.neighbors, vec!["node_11".to_string(), "node_20".to_string()]);
        assert_eq!(n10.degree, 4);
    }

    #[test]
    fn test_tiny_graphs() {
        let store = GraphStore::new();
        chain_graph(&store, 0).unwrap();
        assert_eq!(store.size().unwrap(), 0);
        chain_graph(&store, 1).unwrap();
        assert_eq!(store.edge_count().unwrap(), 0);
    }
}
