use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use hawkeye_core::config::{AppConfig, FeatureConfig, DEFAULT_WORKER_THREADS};
use hawkeye_core::error::{ErrorCode, HawkeyeError};
use hawkeye_core::metrics::{MetricsCollector, MetricsSnapshot};
use hawkeye_core::model::Node;
use storage::{GraphError, GraphStore, GraphView};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::stats::neighbor_degree_stats;
use crate::structural::{clustering_coefficient, coreness_estimate, local_density, two_hop_count};
use crate::vector::{FeatureIndex, FeatureRow, FeatureVector, FEATURE_COUNT};

#[derive(Error, Debug)]
pub enum FeatureError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("worker thread count must be positive")]
    InvalidWorkerCount,
    #[error("failed to spawn feature worker: {0}")]
    WorkerSpawn(String),
    #[error("feature worker {worker} panicked")]
    WorkerPanicked { worker: usize },
}

impl HawkeyeError for FeatureError {
    fn error_code(&self) -> ErrorCode {
        match self {
            FeatureError::Graph(e) => e.error_code(),
            FeatureError::InvalidWorkerCount => ErrorCode::InvalidArgument,
            FeatureError::WorkerSpawn(_) => ErrorCode::ResourceExhausted,
            FeatureError::WorkerPanicked { .. } => ErrorCode::Internal,
        }
    }
}

/// Computes feature vectors from a shared [`GraphStore`].
///
/// The engine owns no graph data. Each call takes a read view of the store,
/// so extraction can overlap with writers without racing them.
pub struct FeatureEngine {
    store: Arc<GraphStore>,
    workers: NonZeroUsize,
    metrics: MetricsCollector,
}

impl FeatureEngine {
    pub fn new(store: Arc<GraphStore>) -> Self {
        let workers = NonZeroUsize::new(DEFAULT_WORKER_THREADS).unwrap_or(NonZeroUsize::MIN);
        Self::with_workers(store, workers)
    }

    pub fn with_workers(store: Arc<GraphStore>, workers: NonZeroUsize) -> Self {
        Self {
            store,
            workers,
            metrics: MetricsCollector::default(),
        }
    }

    pub fn from_config(store: Arc<GraphStore>, config: &FeatureConfig) -> Result<Self, FeatureError> {
        let workers = NonZeroUsize::new(config.worker_threads).ok_or(FeatureError::InvalidWorkerCount)?;
        Ok(Self::with_workers(store, workers))
    }

    /// Worker count from `features`, latency history bound from `metrics`.
    pub fn from_app_config(store: Arc<GraphStore>, config: &AppConfig) -> Result<Self, FeatureError> {
        let engine = Self::from_config(store, &config.features)?;
        Ok(engine.with_metrics(MetricsCollector::new(config.metrics.max_history)))
    }

    /// Share a collector with other components instead of the private default.
    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers.get()
    }

    pub fn store(&self) -> &Arc<GraphStore> {
        &self.store
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Features of one node on the calling thread; `None` when `id` is unknown.
    pub fn extract_features(&self, id: &str) -> Result<Option<FeatureVector>, FeatureError> {
        let started = Instant::now();
        let view = self.store.read()?;
        let features = view.get(id).map(|node| node_features(&view, node));
        drop(view);

        self.metrics
            .record_batch(1, usize::from(features.is_none()), started.elapsed().as_micros() as u64);
        Ok(features)
    }

    /// Features for every id, in input order, computed by up to
    /// `workers` threads over contiguous chunks of `ids`.
    ///
    /// The whole batch reads one view of the store. If any worker fails to
    /// start or panics, the others are still joined and the batch returns
    /// the first error without partial output.
    pub fn extract_batch<S>(&self, ids: &[S]) -> Result<Vec<Option<FeatureVector>>, FeatureError>
    where
        S: AsRef<str> + Sync,
    {
        let started = Instant::now();
        let mut results: Vec<Option<FeatureVector>> = vec![None; ids.len()];
        if ids.is_empty() {
            self.metrics.record_batch(0, 0, started.elapsed().as_micros() as u64);
            return Ok(results);
        }

        let view = self.store.read()?;
        let workers = self.workers.get();
        let chunk_size = chunk_size(ids.len(), workers);
        debug!(
            ids = ids.len(),
            workers,
            chunk_size,
            chunks = ids.len().div_ceil(chunk_size),
            "partitioned feature batch"
        );

        let failure = run_workers(&view, ids, &mut results, chunk_size, extract_one);
        drop(view);

        if let Some(err) = failure {
            return Err(err);
        }

        let missing = results.iter().filter(|r| r.is_none()).count();
        let elapsed_us = started.elapsed().as_micros() as u64;
        self.metrics.record_batch(ids.len(), missing, elapsed_us);
        info!(ids = ids.len(), missing, elapsed_us, "feature batch complete");
        Ok(results)
    }

    /// Rows for every node currently stored, ordered by id.
    pub fn extract_all(&self) -> Result<Vec<FeatureRow>, FeatureError> {
        let ids = self.store.node_ids()?;
        let vectors = self.extract_batch(&ids)?;
        Ok(ids
            .into_iter()
            .zip(vectors)
            .filter_map(|(node_id, features)| features.map(|features| FeatureRow { node_id, features }))
            .collect())
    }
}

/// Ceiling of `len / workers`, never zero.
fn chunk_size(len: usize, workers: usize) -> usize {
    len.div_ceil(workers.max(1)).max(1)
}

fn extract_one(view: &GraphView<'_>, id: &str) -> Option<FeatureVector> {
    view.get(id).map(|node| node_features(view, node))
}

fn run_workers<S, F>(
    view: &GraphView<'_>,
    ids: &[S],
    results: &mut [Option<FeatureVector>],
    chunk_size: usize,
    extract: F,
) -> Option<FeatureError>
where
    S: AsRef<str> + Sync,
    F: Fn(&GraphView<'_>, &str) -> Option<FeatureVector> + Sync,
{
    let extract = &extract;
    thread::scope(|scope| {
        let mut handles = Vec::new();
        let mut failure = None;

        for (worker, (id_chunk, out_chunk)) in ids
            .chunks(chunk_size)
            .zip(results.chunks_mut(chunk_size))
            .enumerate()
        {
            let spawned = thread::Builder::new()
                .name(format!("feature-worker-{worker}"))
                .spawn_scoped(scope, move || {
                    for (id, slot) in id_chunk.iter().zip(out_chunk.iter_mut()) {
                        *slot = extract(view, id.as_ref());
                    }
                });

            match spawned {
                Ok(handle) => handles.push((worker, handle)),
                Err(e) => {
                    error!(worker, error = %e, "failed to spawn feature worker");
                    failure = Some(FeatureError::WorkerSpawn(e.to_string()));
                    break;
                }
            }
        }

        for (worker, handle) in handles {
            if handle.join().is_err() {
                error!(worker, "feature worker panicked");
                failure.get_or_insert(FeatureError::WorkerPanicked { worker });
            }
        }
        failure
    })
}

/// The full feature vector of `node`, resolving neighbors through `view`.
pub fn node_features(view: &GraphView<'_>, node: &Node) -> FeatureVector {
    let degree = node.degree as f32;
    let pagerank = node.pagerank();
    let neighbor_stats = neighbor_degree_stats(view, node);

    let mut out = [0.0f32; FEATURE_COUNT];
    out[FeatureIndex::Degree as usize] = degree;
    out[FeatureIndex::LogDegree as usize] = (degree + 1.0).ln();
    out[FeatureIndex::ClusteringCoefficient as usize] = clustering_coefficient(view, node);
    out[FeatureIndex::Pagerank as usize] = pagerank;
    out[FeatureIndex::NeighborDegreeMean as usize] = neighbor_stats.mean;
    out[FeatureIndex::NeighborDegreeStd as usize] = neighbor_stats.stddev;
    out[FeatureIndex::NeighborDegreeMax as usize] = neighbor_stats.max;
    out[FeatureIndex::NeighborDegreeMin as usize] = neighbor_stats.min;
    out[FeatureIndex::CorenessEstimate as usize] = coreness_estimate(node);
    out[FeatureIndex::DegreeCentrality as usize] = degree;
    out[FeatureIndex::PagerankCentrality as usize] = pagerank;
    out[FeatureIndex::LocalDensity as usize] = local_density(view, node);
    out[FeatureIndex::TwoHopNeighbors as usize] = two_hop_count(view, node) as f32;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_size() {
        assert_eq!(chunk_size(10, 4), 3);
        assert_eq!(chunk_size(8, 4), 2);
        assert_eq!(chunk_size(3, 8), 1);
        assert_eq!(chunk_size(1, 1), 1);
    }

    #[test]
    fn test_from_config_rejects_zero_workers() {
        let store = Arc::new(GraphStore::new());
        let err = FeatureEngine::from_config(store, &FeatureConfig { worker_threads: 0 })
            .err()
            .unwrap();
        assert!(matches!(err, FeatureError::InvalidWorkerCount));
        assert_eq!(err.error_code(), ErrorCode::InvalidArgument);
    }

    #[test]
    fn test_panicking_worker_fails_batch_after_joining_others() {
        let store = GraphStore::new();
        for id in ["a", "b", "c", "d", "e", "f"] {
            store.add_node(id, vec![]).unwrap();
        }
        let view = store.read().unwrap();
        let ids = ["a", "b", "c", "d", "e", "f"];
        let mut results = vec![None; ids.len()];

        // chunks: [a, b] [c, d] [e, f]; the middle worker dies on "d"
        let failure = run_workers(&view, &ids, &mut results, 2, |view, id| {
            if id == "d" {
                panic!("forced failure on {id}");
            }
            extract_one(view, id)
        });

        assert!(matches!(failure, Some(FeatureError::WorkerPanicked { worker: 1 })));
        assert_eq!(failure.unwrap().error_code(), ErrorCode::Internal);
        // the other workers ran to completion
        for i in [0, 1, 4, 5] {
            assert!(results[i].is_some(), "slot {i}");
        }
    }

    #[test]
    fn test_run_workers_without_failure() {
        let store = GraphStore::new();
        store.add_node("a", vec![]).unwrap();
        let view = store.read().unwrap();
        let ids = ["a", "missing", "a"];
        let mut results = vec![None; ids.len()];

        assert!(run_workers(&view, &ids, &mut results, 1, extract_one).is_none());
        assert!(results[0].is_some());
        assert!(results[1].is_none());
        assert_eq!(results[0], results[2]);
    }

    #[test]
    fn test_from_app_config_applies_workers_and_history() {
        let mut config = AppConfig::default();
        config.features.worker_threads = 3;
        config.metrics.max_history = 2;

        let store = Arc::new(GraphStore::new());
        store.add_node("a", vec![]).unwrap();
        let engine = FeatureEngine::from_app_config(store, &config).unwrap();
        assert_eq!(engine.workers(), 3);

        for _ in 0..5 {
            engine.extract_features("a").unwrap();
        }
        let snap = engine.metrics();
        assert_eq!(snap.total_batches, 5);
        assert_eq!(snap.history_count, 2);
    }

    #[test]
    fn test_default_worker_count() {
        let engine = FeatureEngine::new(Arc::new(GraphStore::new()));
        assert_eq!(engine.workers(), 4);
    }
}
