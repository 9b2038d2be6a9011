//! Graph-specific error types.
//!
//! Two kinds of failure exist in the graph:
//!
//! - [`FlowError`] is a caller contract violation (pushing into a terminated
//!   node, wiring a cycle, ...). It is returned to the caller immediately.
//! - Delivery failures are plain `anyhow::Error`s raised by receivers and
//!   transforms while values flow. They are routed through the nodes' `fail`
//!   handling and never returned from `push`. Failures nobody accepted end up
//!   in the graph's unhandled-failure sink as an [`UnhandledFailure`].

use crate::graph::id::NodeId;
use crate::graph::node::NodeState;
use thiserror::Error;

/// Errors returned by graph operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("Operation not allowed on node {node:?} in state {state:?}")]
    IllegalState { node: NodeId, state: NodeState },

    #[error("Unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("Invalid wiring: {0}")]
    InvalidWiring(String),
}

pub type FlowResult<T> = std::result::Result<T, FlowError>;

/// A delivery failure that no receiver accepted.
#[derive(Debug)]
pub struct UnhandledFailure<'a> {
    /// Node at which the failure stopped.
    pub node: NodeId,
    /// Name of that node.
    pub name: &'a str,
    /// The original failure.
    pub error: &'a anyhow::Error,
}

impl std::fmt::Display for UnhandledFailure<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:?}) unhandled error: {}", self.name, self.node, self.error)
    }
}
