use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
pub struct ExtractionMetrics {
    pub total_batches: u64,
    pub total_requested: u64,
    pub total_missing: u64,
    pub latencies: VecDeque<u64>, // microseconds
}

/// Records every extraction call made by a feature engine.
#[derive(Clone)]
pub struct MetricsCollector {
    state: Arc<Mutex<MetricsState>>,
}

struct MetricsState {
    extraction: ExtractionMetrics,
    max_history: usize,
}

impl MetricsCollector {
    pub fn new(max_history: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(MetricsState {
                extraction: ExtractionMetrics::default(),
                max_history: max_history.max(1),
            })),
        }
    }

    pub fn record_batch(&self, requested: usize, missing: usize, latency_us: u64) {
        let mut state = self.lock();
        let max_history = state.max_history;
        let m = &mut state.extraction;
        m.total_batches += 1;
        m.total_requested += requested as u64;
        m.total_missing += missing as u64;
        m.latencies.push_back(latency_us);
        if m.latencies.len() > max_history {
            m.latencies.pop_front();
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let state = self.lock();
        let m = &state.extraction;

        let mut sorted_latencies: Vec<u64> = m.latencies.iter().copied().collect();
        sorted_latencies.sort_unstable();

        let p50 = percentile(&sorted_latencies, 50.0);
        let p95 = percentile(&sorted_latencies, 95.0);
        let p99 = percentile(&sorted_latencies, 99.0);

        let hit_rate = if m.total_requested > 0 {
            (m.total_requested - m.total_missing) as f32 / m.total_requested as f32
        } else {
            0.0
        };

        MetricsSnapshot {
            total_batches: m.total_batches,
            total_requested: m.total_requested,
            total_missing: m.total_missing,
            hit_rate,
            p50,
            p95,
            p99,
            history_count: m.latencies.len(),
        }
    }

    // A panic while holding the lock cannot leave the counters half-written,
    // so a poisoned state is still usable.
    fn lock(&self) -> MutexGuard<'_, MetricsState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_METRICS_HISTORY)
    }
}

fn percentile(sorted: &[u64], p: f32) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let idx = ((p / 100.0) * (sorted.len() as f32)).ceil() as usize;
    sorted[idx.saturating_sub(1).min(sorted.len() - 1)]
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MetricsSnapshot {
    pub total_batches: u64,
    pub total_requested: u64,
    pub total_missing: u64,
    pub hit_rate: f32,
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub history_count: usize,
}
