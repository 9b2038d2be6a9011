//! Identity types for the dataflow graph.
//!
//! `NodeId` is a newtype over `u32` that serves as a direct index into the
//! graph's slot vector, providing O(1) lookup. Slots are never reused, so an
//! id stays valid (and keeps pointing at the same node) for the lifetime of
//! its graph, even after the node has terminated.
//!
//! Node *names* are separate: human-readable strings that are either supplied
//! by the caller or generated from a process-wide counter.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Index into `Graph::slots`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const INVALID: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "NodeId(INVALID)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

static NEXT_NAME: AtomicU64 = AtomicU64::new(0);

/// Next value of the process-wide name counter.
pub fn next_id() -> u64 {
    NEXT_NAME.fetch_add(1, Ordering::Relaxed)
}

/// Generate a process-unique node name such as `sub-12`.
pub fn generate_name(prefix: &str) -> String {
    format!("{}-{}", prefix, next_id())
}
