use hawkeye_core::config::{EdgePolicy, GraphConfig};
use hawkeye_core::error::{ErrorCode, HawkeyeError};
use hawkeye_core::model::{ExternalAnnotations, Node};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("node not found: {0}")]
    NodeNotFound(String),
    #[error("graph store lock poisoned")]
    LockPoisoned,
}

impl HawkeyeError for GraphError {
    fn error_code(&self) -> ErrorCode {
        match self {
            GraphError::NodeNotFound(_) => ErrorCode::NotFound,
            GraphError::LockPoisoned => ErrorCode::Internal,
        }
    }
}

/// Thread-safe node map with directed adjacency records.
///
/// Mutations take the write side of one lock over the whole map; lookups and
/// feature extraction take the read side, so they may run concurrently with
/// each other but never observe a half-applied mutation.
pub struct GraphStore {
    nodes: RwLock<HashMap<String, Node>>,
    edge_policy: EdgePolicy,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::with_policy(EdgePolicy::Ignore)
    }

    pub fn with_policy(edge_policy: EdgePolicy) -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
            edge_policy,
        }
    }

    pub fn from_config(config: &GraphConfig) -> Self {
        Self::with_policy(config.edge_policy)
    }

    pub fn edge_policy(&self) -> EdgePolicy {
        self.edge_policy
    }

    /// Insert a fresh node, replacing any previous state stored under `id`.
    ///
    /// Only the node itself is reset. Other nodes keep their degree counts
    /// and any neighbor entries that name `id`.
    pub fn add_node(&self, id: impl Into<String>, raw_features: Vec<f32>) -> Result<(), GraphError> {
        let node = Node::new(id, raw_features);
        let mut nodes = self.write()?;
        nodes.insert(node.id().to_string(), node);
        Ok(())
    }

    /// Record the directed edge `from -> to`.
    ///
    /// Both endpoints must already exist. Returns `Ok(false)` when an endpoint
    /// is missing and the store ignores such edges; with
    /// [`EdgePolicy::Reject`] the missing id is reported instead.
    pub fn add_edge(&self, from: &str, to: &str) -> Result<bool, GraphError> {
        let mut nodes = self.write()?;

        for endpoint in [from, to] {
            if !nodes.contains_key(endpoint) {
                return match self.edge_policy {
                    EdgePolicy::Ignore => {
                        debug!(from, to, missing = endpoint, "ignoring edge with unknown endpoint");
                        Ok(false)
                    }
                    EdgePolicy::Reject => Err(GraphError::NodeNotFound(endpoint.to_string())),
                };
            }
        }

        if let Some(source) = nodes.get_mut(from) {
            source.neighbors.push(to.to_string());
            source.degree += 1;
        }
        if let Some(target) = nodes.get_mut(to) {
            target.degree += 1;
        }
        Ok(true)
    }

    /// Replace the externally computed values of an existing node.
    pub fn annotate(&self, id: &str, annotations: ExternalAnnotations) -> Result<bool, GraphError> {
        let mut nodes = self.write()?;
        match nodes.get_mut(id) {
            Some(node) => {
                node.annotations = annotations;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn get_node(&self, id: &str) -> Result<Option<Node>, GraphError> {
        Ok(self.read()?.get(id).cloned())
    }

    pub fn size(&self) -> Result<usize, GraphError> {
        Ok(self.read()?.len())
    }

    /// Number of directed adjacency records across all nodes.
    pub fn edge_count(&self) -> Result<usize, GraphError> {
        Ok(self.read()?.edge_count())
    }

    pub fn node_ids(&self) -> Result<Vec<String>, GraphError> {
        let view = self.read()?;
        let mut out: Vec<String> = view.nodes.keys().cloned().collect();
        out.sort_unstable();
        Ok(out)
    }

    /// Shared, consistent view of the graph. Mutations block until it is dropped.
    pub fn read(&self) -> Result<GraphView<'_>, GraphError> {
        let nodes = self.nodes.read().map_err(|_| GraphError::LockPoisoned)?;
        Ok(GraphView { nodes })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Node>>, GraphError> {
        self.nodes.write().map_err(|_| GraphError::LockPoisoned)
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Read guard over the node map.
pub struct GraphView<'a> {
    nodes: RwLockReadGuard<'a, HashMap<String, Node>>,
}

impl GraphView<'_> {
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.neighbors.len()).sum()
    }

    /// Sum of every node's incidence count.
    ///
    /// Twice [`Self::edge_count`] as long as no node has been re-added after
    /// taking part in an edge.
    pub fn total_degree(&self) -> u64 {
        self.nodes.values().map(|n| n.degree).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_node_replaces_state() {
        let store = GraphStore::new();
        store.add_node("a", vec![1.0]).unwrap();
        store.add_node("b", vec![]).unwrap();
        store.add_edge("a", "b").unwrap();

        store.add_node("a", vec![2.0]).unwrap();
        let a = store.get_node("a").unwrap().unwrap();
        assert_eq!(a.degree, 0);
        assert!(a.neighbors.is_empty());
        assert_eq!(a.raw_features, vec![2.0]);
        assert_eq!(store.size().unwrap(), 2);
    }

    #[test]
    fn test_edge_updates_both_degrees_but_one_neighbor_list() {
        let store = GraphStore::new();
        store.add_node("a", vec![]).unwrap();
        store.add_node("b", vec![]).unwrap();

        assert!(store.add_edge("a", "b").unwrap());

        let a = store.get_node("a").unwrap().unwrap();
        let b = store.get_node("b").unwrap().unwrap();
        assert_eq!(a.degree, 1);
        assert_eq!(b.degree, 1);
        assert_eq!(a.neighbors, vec!["b".to_string()]);
        assert!(b.neighbors.is_empty());
    }

    #[test]
    fn test_self_loop_counts_twice() {
        let store = GraphStore::new();
        store.add_node("a", vec![]).unwrap();
        store.add_edge("a", "a").unwrap();

        let a = store.get_node("a").unwrap().unwrap();
        assert_eq!(a.degree, 2);
        assert_eq!(a.neighbors, vec!["a".to_string()]);
    }

    #[test]
    fn test_reject_policy_reports_missing_endpoint() {
        let store = GraphStore::with_policy(EdgePolicy::Reject);
        store.add_node("a", vec![]).unwrap();

        let err = store.add_edge("a", "ghost").unwrap_err();
        assert_eq!(err, GraphError::NodeNotFound("ghost".to_string()));
        assert_eq!(err.error_code(), ErrorCode::NotFound);
        assert_eq!(store.get_node("a").unwrap().unwrap().degree, 0);
    }

    #[test]
    fn test_from_config_applies_edge_policy() {
        let store = GraphStore::from_config(&GraphConfig {
            edge_policy: EdgePolicy::Reject,
        });
        assert_eq!(store.edge_policy(), EdgePolicy::Reject);
        store.add_node("a", vec![]).unwrap();
        assert!(store.add_edge("a", "b").is_err());
    }

    #[test]
    fn test_annotate() {
        let store = GraphStore::new();
        store.add_node("a", vec![]).unwrap();

        let ann = ExternalAnnotations {
            clustering_coefficient: 0.5,
            pagerank: 0.25,
        };
        assert!(store.annotate("a", ann).unwrap());
        assert!(!store.annotate("missing", ann).unwrap());
        assert_eq!(store.get_node("a").unwrap().unwrap().annotations, ann);
    }
}
