//! Worker source: a channel-backed producer for one root node.
//!
//! The same type covers two cases:
//!
//! - the producer already exists and owns a sender
//!   ([`WorkerSource::from_receiver`]), or
//! - a dedicated thread has to be started for it ([`WorkerSource::spawn`]).
//!
//! Either way the graph side only ever calls [`pump`](WorkerSource::pump)
//! (non-blocking) or [`run`](WorkerSource::run) (blocking).

use crate::error::{DataflowError, Result};
use crate::graph::{Graph, NodeId};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use std::thread::JoinHandle;

/// Message from a producer to the graph thread.
#[derive(Debug)]
pub enum WorkerMessage<V> {
    /// A value to push into the root.
    Value(V),
    /// The producer finished; completes the root.
    Done,
    /// The producer failed; fails the root.
    Failed(anyhow::Error),
}

/// Producer-side handle passed to the closure of [`WorkerSource::spawn`].
pub struct WorkerHandle<V> {
    tx: Sender<WorkerMessage<V>>,
}

impl<V> Clone for WorkerHandle<V> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<V> WorkerHandle<V> {
    pub fn new(tx: Sender<WorkerMessage<V>>) -> Self {
        Self { tx }
    }

    /// Send a value. Returns false once the graph side has gone away.
    pub fn send(&self, value: V) -> bool {
        self.tx.send(WorkerMessage::Value(value)).is_ok()
    }

    pub fn done(&self) {
        let _ = self.tx.send(WorkerMessage::Done);
    }

    pub fn fail(&self, error: impl Into<anyhow::Error>) {
        let _ = self.tx.send(WorkerMessage::Failed(error.into()));
    }
}

/// Graph-side end of a producer.
pub struct WorkerSource<V> {
    name: String,
    rx: Receiver<WorkerMessage<V>>,
    thread: Option<JoinHandle<()>>,
    finished: bool,
}

impl<V: Clone + 'static> WorkerSource<V> {
    /// Wrap a channel whose sender is owned by an existing producer.
    pub fn from_receiver(name: impl Into<String>, rx: Receiver<WorkerMessage<V>>) -> Self {
        Self {
            name: name.into(),
            rx,
            thread: None,
            finished: false,
        }
    }

    /// Start `producer` on a named thread, connected through a channel of
    /// `capacity` messages.
    pub fn spawn<F>(name: impl Into<String>, capacity: usize, producer: F) -> Result<Self>
    where
        V: Send,
        F: FnOnce(WorkerHandle<V>) + Send + 'static,
    {
        let name = name.into();
        if capacity == 0 {
            return Err(DataflowError::Worker(format!(
                "{}: channel capacity must be at least 1",
                name
            )));
        }
        let (tx, rx) = bounded(capacity);
        let handle = WorkerHandle::new(tx);

        let thread = std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || producer(handle))
            .map_err(|e| DataflowError::Worker(format!("Failed to spawn {}: {}", name, e)))?;

        tracing::debug!("Spawned worker {} (capacity {})", name, capacity);
        Ok(Self {
            name,
            rx,
            thread: Some(thread),
            finished: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a terminal message (or disconnect) has been forwarded.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Forward every message that is already queued. Never blocks.
    ///
    /// Returns the number of messages forwarded.
    pub fn pump(&mut self, graph: &mut Graph<V>, root: NodeId) -> Result<usize> {
        let mut forwarded = 0;
        while !self.finished {
            if graph.state(root)?.is_terminated() {
                self.stop(root);
                break;
            }
            match self.rx.try_recv() {
                Ok(msg) => {
                    self.forward(graph, root, msg)?;
                    forwarded += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::debug!("{} disconnected, completing {:?}", self.name, root);
                    self.finished = true;
                    graph.complete(root)?;
                }
            }
        }
        Ok(forwarded)
    }

    /// Forward messages until the producer finishes or the root terminates.
    pub fn run(&mut self, graph: &mut Graph<V>, root: NodeId) -> Result<usize> {
        let mut forwarded = 0;
        while !self.finished {
            if graph.state(root)?.is_terminated() {
                self.stop(root);
                break;
            }
            match self.rx.recv() {
                Ok(msg) => {
                    self.forward(graph, root, msg)?;
                    forwarded += 1;
                }
                Err(_) => {
                    tracing::debug!("{} disconnected, completing {:?}", self.name, root);
                    self.finished = true;
                    graph.complete(root)?;
                }
            }
        }
        Ok(forwarded)
    }

    /// Wait for a spawned producer thread to exit.
    ///
    /// Drops the receiving end first so a producer blocked on a full channel
    /// sees the disconnect.
    pub fn join(self) -> Result<()> {
        let Self {
            name, rx, thread, ..
        } = self;
        drop(rx);
        match thread {
            Some(thread) => thread
                .join()
                .map_err(|_| DataflowError::Worker(format!("{} panicked", name))),
            None => Ok(()),
        }
    }

    fn forward(&mut self, graph: &mut Graph<V>, root: NodeId, msg: WorkerMessage<V>) -> Result<()> {
        match msg {
            WorkerMessage::Value(value) => graph.push(root, value)?,
            WorkerMessage::Done => {
                self.finished = true;
                graph.complete(root)?;
            }
            WorkerMessage::Failed(error) => {
                tracing::debug!("{} reported failure: {}", self.name, error);
                self.finished = true;
                graph.fail(root, error)?;
            }
        }
        Ok(())
    }

    fn stop(&mut self, root: NodeId) {
        tracing::debug!("{} stopping, {:?} already terminated", self.name, root);
        self.finished = true;
    }
}
