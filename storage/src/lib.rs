pub mod graph;

pub use graph::{GraphError, GraphStore, GraphView};
