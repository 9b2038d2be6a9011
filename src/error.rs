//! Error handling for dataflow-rs
//!
//! This module defines the crate-level error type and a Result alias used
//! by everything outside the graph's own hot path (configuration, worker
//! sources, the demo binary). Graph operations return
//! [`FlowError`](crate::graph::FlowError), which converts into
//! [`DataflowError`] with `?`.

use crate::graph::FlowError;
use thiserror::Error;

/// Main error type for dataflow-rs operations
#[derive(Error, Debug)]
pub enum DataflowError {
    /// Graph contract violations
    #[error("Graph error: {0}")]
    Flow(#[from] FlowError),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to worker sources
    #[error("Worker error: {0}")]
    Worker(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<DataflowError>,
    },
}

impl DataflowError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        DataflowError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for dataflow-rs operations
pub type Result<T> = std::result::Result<T, DataflowError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, FlowError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| DataflowError::from(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| DataflowError::from(e).with_context(f()))
    }
}
