//! Mock construction helpers

use crossbeam_channel::{bounded, Receiver, Sender};
use dataflow_rs::graph::{Callbacks, Graph, NodeId};
use dataflow_rs::WorkerMessage;
use std::cell::RefCell;
use std::rc::Rc;

/// Create a worker channel with default size
pub fn create_test_channel<T>() -> (Sender<WorkerMessage<T>>, Receiver<WorkerMessage<T>>) {
    bounded(16)
}

/// Receiver that fails on every value with `message`.
pub fn failing_receiver(message: &'static str) -> Callbacks<i32> {
    Callbacks::new(move |_: &i32| Err(anyhow::anyhow!(message)))
}

/// Install a sink on `graph` recording unhandled failures as `(node, message)`.
pub fn capture_unhandled(graph: &mut Graph<i32>) -> Rc<RefCell<Vec<(NodeId, String)>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    graph.set_unhandled_sink(move |failure| {
        sink.borrow_mut()
            .push((failure.node, failure.error.to_string()));
    });
    log
}
