//! Per-node topology features for the account/device graph.
//!
//! Every extracted vector has [`FEATURE_COUNT`] entries in the order given by
//! [`FeatureIndex`]; downstream models index into it positionally.

pub mod engine;
pub mod stats;
pub mod structural;
pub mod vector;

pub use engine::{node_features, FeatureEngine, FeatureError};
pub use stats::NeighborDegreeStats;
pub use vector::{FeatureIndex, FeatureRow, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
