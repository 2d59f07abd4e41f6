use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use config::builder::DefaultState;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::debug;

/// What `add_edge` does when one of its endpoints has not been added yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// Drop the edge without reporting anything.
    #[default]
    Ignore,
    /// Refuse the edge with a not-found error.
    Reject,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct GraphConfig {
    pub edge_policy: EdgePolicy,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FeatureConfig {
    pub worker_threads: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    pub max_history: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub graph: GraphConfig,
    pub features: FeatureConfig,
    pub metrics: MetricsConfig,
}

pub const DEFAULT_WORKER_THREADS: usize = 4;
pub const DEFAULT_METRICS_HISTORY: usize = 1024;

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            graph: GraphConfig {
                edge_policy: EdgePolicy::Ignore,
            },
            features: FeatureConfig {
                worker_threads: DEFAULT_WORKER_THREADS,
            },
            metrics: MetricsConfig {
                max_history: DEFAULT_METRICS_HISTORY,
            },
        }
    }
}

impl AppConfig {
    /// Defaults, then `config/default`, then `config/{RUN_MODE}`, then `HAWKEYE_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        debug!(run_mode = %run_mode, "loading configuration");

        let builder = defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(environment());

        builder.build()?.try_deserialize()
    }

    /// Defaults overlaid with a single, mandatory file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = defaults()?.add_source(File::from(path.as_ref()).required(true));

        builder.build()?.try_deserialize()
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("graph.edge_policy", "ignore")?
        .set_default("features.worker_threads", DEFAULT_WORKER_THREADS as i64)?
        .set_default("metrics.max_history", DEFAULT_METRICS_HISTORY as i64)
}

fn environment() -> Environment {
    // HAWKEYE_FEATURES__WORKER_THREADS=8
    Environment::with_prefix("HAWKEYE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
