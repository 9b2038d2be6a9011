//! Push-based dataflow graph.
//!
//! Values are pushed into root nodes and multicast down a tree of nodes. Each
//! node may run a transform over incoming values and may carry a receiver that
//! sees everything the node dispatches.
//!
//! # Architecture
//!
//! ```text
//! [source] ──► [map] ──► [take(3)] ──► (receiver)
//!          │
//!          └─► (receiver)
//! ```
//!
//! # Design
//!
//! - **Arena**: all nodes live in `Graph::slots`, addressed by `NodeId`.
//!   Parents are non-owning ids, so there are no reference cycles.
//! - **Synchronous**: `push`, `complete` and `fail` run to completion on the
//!   caller's stack.
//! - **Reentrant**: receivers get `&mut Graph` and may push, attach or detach
//!   while a delivery is in progress. Cascades iterate over child snapshots.
//! - **Replay**: a new child immediately receives its parent's last value.

pub mod attach;
pub mod error;
pub mod executor;
pub mod id;
pub mod node;
pub mod transform;
pub mod transforms;

pub use attach::Attach;
pub use error::{FlowError, FlowResult, UnhandledFailure};
pub use executor::{Graph, NodeSnapshot, UnhandledSink};
pub use id::{generate_name, NodeId};
pub use node::{Callbacks, Collected, Collector, NodeSlot, NodeState, Receiver};
pub use transform::{Compose, Step, Transform};
