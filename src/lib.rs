//! # dataflow-rs: push-based reactive dataflow graphs
//!
//! Values are pushed into root nodes and multicast synchronously down a tree
//! of subscriptions. Nodes can transform what flows through them, end their
//! stream early, and tear themselves down when nobody is listening any more.
//!
//! ## Architecture
//!
//! - **Graph**: arena of nodes with push / complete / fail / detach
//!   ([`graph`])
//! - **Transforms**: per-node reduction steps such as map, filter and take
//!   ([`graph::transforms`])
//! - **Sources**: channel-backed producers running on other threads
//!   ([`source`])
//! - **Configuration**: JSON-stored [`GraphConfig`] for naming and logging
//!
//! ## Example
//!
//! ```ignore
//! use dataflow_rs::graph::{transforms::Filter, Attach, Collector, Graph};
//!
//! let mut graph: Graph<i32> = Graph::new();
//! let root = graph.source();
//!
//! let all = Collector::new();
//! let large = Collector::new();
//! graph.subscribe(root, all.clone())?;
//! graph.attach(
//!     root,
//!     Attach::transform(Filter::new(|x: &i32| *x > 10)).with_receiver(large.clone()),
//! )?;
//!
//! graph.push(root, 5)?;
//! graph.push(root, 20)?;
//! assert_eq!(all.values(), vec![5, 20]);
//! assert_eq!(large.values(), vec![20]);
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod source;

// Re-export commonly used types
pub use config::GraphConfig;
pub use error::{DataflowError, Result, ResultExt};
pub use graph::{
    Attach, Callbacks, Collector, FlowError, FlowResult, Graph, NodeId, NodeState, Receiver,
    Transform,
};
pub use source::{WorkerHandle, WorkerMessage, WorkerSource};
