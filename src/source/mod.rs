//! Producers that feed a graph from outside its thread.
//!
//! The graph itself is single-threaded. A [`WorkerSource`] owns the receiving
//! end of a bounded crossbeam channel and forwards whatever arrives into a
//! root node on the graph's thread:
//!
//! ```text
//! [worker thread] ──WorkerMessage──► [WorkerSource::pump] ──push──► [root]
//! ```

pub mod worker;

pub use worker::{WorkerHandle, WorkerMessage, WorkerSource};
