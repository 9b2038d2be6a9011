//! Configuration module for dataflow-rs
//!
//! A [`GraphConfig`] controls the ambient behaviour of a graph: how generated
//! node names look, how chatty dispatch logging is, whether unhandled
//! failures are logged by the default sink, and how large worker channels
//! are. It is stored as pretty-printed JSON.
//!
//! # Example
//!
//! ```ignore
//! use dataflow_rs::config::GraphConfig;
//! use dataflow_rs::graph::Graph;
//!
//! let config = GraphConfig::load_or_default("graph.json");
//! let mut graph: Graph<f64> = Graph::with_config(config);
//! ```

use crate::error::{DataflowError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default prefix for root source names
pub const DEFAULT_SOURCE_PREFIX: &str = "stream";

/// Default prefix for nodes wrapping a receiver
pub const DEFAULT_RECEIVER_PREFIX: &str = "sub";

/// Default prefix for transform-only nodes
pub const DEFAULT_TRANSFORM_PREFIX: &str = "xform";

/// Default bound of worker source channels
pub const DEFAULT_WORKER_CHANNEL_CAPACITY: usize = 256;

fn default_config_version() -> u32 {
    1
}

/// Graph configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Config format version
    #[serde(default = "default_config_version")]
    pub version: u32,

    /// Name prefix for nodes created with `Graph::source`
    pub source_id_prefix: String,

    /// Name prefix for nodes that wrap a receiver
    pub receiver_id_prefix: String,

    /// Name prefix for nodes that only transform
    pub transform_id_prefix: String,

    /// Emit a trace event for every dispatched value
    pub trace_dispatch: bool,

    /// Whether the default unhandled-failure sink logs at error level
    pub log_unhandled: bool,

    /// Bound of the channel created by `WorkerSource::spawn`
    pub worker_channel_capacity: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            version: 1,
            source_id_prefix: DEFAULT_SOURCE_PREFIX.to_string(),
            receiver_id_prefix: DEFAULT_RECEIVER_PREFIX.to_string(),
            transform_id_prefix: DEFAULT_TRANSFORM_PREFIX.to_string(),
            trace_dispatch: false,
            log_unhandled: true,
            worker_channel_capacity: DEFAULT_WORKER_CHANNEL_CAPACITY,
        }
    }
}

impl GraphConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable per-value dispatch tracing
    pub fn with_trace_dispatch(mut self, enabled: bool) -> Self {
        self.trace_dispatch = enabled;
        self
    }

    /// Set the worker channel bound
    pub fn with_worker_channel_capacity(mut self, capacity: usize) -> Self {
        self.worker_channel_capacity = capacity;
        self
    }

    /// Check values that would make a graph misbehave
    pub fn validate(&self) -> Result<()> {
        for (field, prefix) in [
            ("source_id_prefix", &self.source_id_prefix),
            ("receiver_id_prefix", &self.receiver_id_prefix),
            ("transform_id_prefix", &self.transform_id_prefix),
        ] {
            if prefix.is_empty() {
                return Err(DataflowError::Config(format!("{} must not be empty", field)));
            }
        }
        if self.worker_channel_capacity == 0 {
            return Err(DataflowError::Config(
                "worker_channel_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load a configuration file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DataflowError::from(e).with_context(format!("Failed to read config file {:?}", path))
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            DataflowError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, returning defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load graph config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save configuration to disk as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DataflowError::from(e)
                        .with_context(format!("Failed to create config directory {:?}", parent))
                })?;
            }
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| DataflowError::Serialization(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            DataflowError::from(e).with_context(format!("Failed to write config file {:?}", path))
        })
    }
}
