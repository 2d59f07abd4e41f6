use serde::{Deserialize, Serialize};

/// Values computed outside this workspace and attached to a node.
///
/// Structural mutations never touch these; they change only when a caller
/// replaces them explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExternalAnnotations {
    pub clustering_coefficient: f32,
    pub pagerank: f32,
}

impl Default for ExternalAnnotations {
    fn default() -> Self {
        Self {
            clustering_coefficient: 0.0,
            pagerank: 1.0,
        }
    }
}

/// A vertex of the account/device graph.
///
/// `degree` is an incidence count: it grows by one for every recorded edge
/// the node takes part in, as source or as target. `neighbors` only holds
/// outgoing targets, so a node that is only ever a target has a non-zero
/// degree and an empty neighbor list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: String,
    pub raw_features: Vec<f32>,
    pub neighbors: Vec<String>,
    pub degree: u64,
    pub annotations: ExternalAnnotations,
}

impl Node {
    pub fn new(id: impl Into<String>, raw_features: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            raw_features,
            neighbors: Vec::new(),
            degree: 0,
            annotations: ExternalAnnotations::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn pagerank(&self) -> f32 {
        self.annotations.pagerank
    }

    /// Linear scan, duplicates included.
    pub fn has_neighbor(&self, id: &str) -> bool {
        self.neighbors.iter().any(|n| n == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_defaults() {
        let node = Node::new("acct-1", vec![1.0, 2.0]);
        assert_eq!(node.id(), "acct-1");
        assert_eq!(node.degree, 0);
        assert!(node.neighbors.is_empty());
        assert_eq!(node.annotations.clustering_coefficient, 0.0);
        assert_eq!(node.pagerank(), 1.0);
        assert_eq!(node.raw_features, vec![1.0, 2.0]);
    }

    #[test]
    fn test_has_neighbor() {
        let mut node = Node::new("a", vec![]);
        node.neighbors.push("b".to_string());
        assert!(node.has_neighbor("b"));
        assert!(!node.has_neighbor("c"));
    }
}
