use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 13;

/// Fixed-layout feature vector; see [`FeatureIndex`] for the positions.
pub type FeatureVector = [f32; FEATURE_COUNT];

/// Position of each value inside a [`FeatureVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum FeatureIndex {
    Degree = 0,
    LogDegree,
    ClusteringCoefficient,
    Pagerank,
    NeighborDegreeMean,
    NeighborDegreeStd,
    NeighborDegreeMax,
    NeighborDegreeMin,
    CorenessEstimate,
    DegreeCentrality,
    PagerankCentrality,
    LocalDensity,
    TwoHopNeighbors,
}

impl FeatureIndex {
    pub const ALL: [FeatureIndex; FEATURE_COUNT] = [
        FeatureIndex::Degree,
        FeatureIndex::LogDegree,
        FeatureIndex::ClusteringCoefficient,
        FeatureIndex::Pagerank,
        FeatureIndex::NeighborDegreeMean,
        FeatureIndex::NeighborDegreeStd,
        FeatureIndex::NeighborDegreeMax,
        FeatureIndex::NeighborDegreeMin,
        FeatureIndex::CorenessEstimate,
        FeatureIndex::DegreeCentrality,
        FeatureIndex::PagerankCentrality,
        FeatureIndex::LocalDensity,
        FeatureIndex::TwoHopNeighbors,
    ];

    pub fn name(self) -> &'static str {
        FEATURE_NAMES[self as usize]
    }
}

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "degree",
    "log_degree",
    "clustering_coefficient",
    "pagerank",
    "neighbor_degree_mean",
    "neighbor_degree_std",
    "neighbor_degree_max",
    "neighbor_degree_min",
    "coreness_estimate",
    "degree_centrality",
    "pagerank_centrality",
    "local_density",
    "two_hop_neighbors",
];

/// One node's features, ready to hand to a scoring model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub node_id: String,
    pub features: FeatureVector,
}

impl FeatureRow {
    pub fn get(&self, index: FeatureIndex) -> f32 {
        self.features[index as usize]
    }

    pub fn named(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.features.iter().copied())
    }

    /// `node_id` plus one entry per feature, keyed by [`FEATURE_NAMES`].
    pub fn to_named_map(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::with_capacity(FEATURE_COUNT + 1);
        map.insert("node_id".to_string(), self.node_id.clone().into());
        for (name, value) in self.named() {
            map.insert(name.to_string(), f64::from(value).into());
        }
        map
    }

    /// Single-line JSON, suitable for a JSON-lines export.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
