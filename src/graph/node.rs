//! Node abstraction for the dataflow graph.
//!
//! A node lives in a [`NodeSlot`] inside the graph's arena. It may carry:
//! - a **[`Receiver`]**, the consumer that was attached together with the node
//!   (values, completion and failures are delivered to it), and
//! - a **[`Transform`]**, the reduction step every incoming value runs through.
//!
//! Downstream nodes are listed by id in `children`; the parent is a
//! non-owning id, so the arena is the only owner of any node.

use crate::graph::executor::Graph;
use crate::graph::id::NodeId;
use crate::graph::transform::Transform;
use std::cell::RefCell;
use std::rc::Rc;

/// Lifecycle state of a node. Ordered: `Idle < Active < Done < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeState {
    /// No child attached yet.
    Idle,
    /// At least one child has been attached.
    Active,
    /// Terminated normally.
    Done,
    /// Terminated by a failure.
    Error,
}

impl NodeState {
    #[inline]
    pub fn is_terminated(self) -> bool {
        self >= NodeState::Done
    }
}

/// Consumer of the values flowing out of a node.
///
/// Only `receive` is mandatory. A receiver that wants to handle failures
/// overrides both [`accepts_failures`](Receiver::accepts_failures) and
/// [`fail`](Receiver::fail); otherwise failures are delegated to the node
/// wrapping it.
pub trait Receiver<V> {
    /// Handle one value. The graph is passed in so receivers can push,
    /// complete or rewire nodes while a delivery is in progress.
    ///
    /// A receiver is never re-entered: values dispatched by its own node
    /// while this call is running are not delivered to it, although the
    /// node's `deref` still reports them. Completion and failures arriving
    /// in the meantime are delivered after the call returns.
    fn receive(&mut self, value: &V, graph: &mut Graph<V>) -> anyhow::Result<()>;

    /// Called once when the upstream node completes.
    fn complete(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Whether this receiver has a failure handler.
    fn accepts_failures(&self) -> bool {
        false
    }

    /// Failure handler. Only called when `accepts_failures` returns true.
    fn fail(&mut self, _error: &anyhow::Error) {}
}

type ValueFn<V> = Box<dyn FnMut(&V, &mut Graph<V>) -> anyhow::Result<()>>;
type CompleteFn = Box<dyn FnMut() -> anyhow::Result<()>>;
type FailFn = Box<dyn FnMut(&anyhow::Error)>;

/// Receiver assembled from closures.
///
/// ```ignore
/// let sink = Callbacks::new(|v: &i32| {
///     println!("got {}", v);
///     Ok(())
/// })
/// .on_fail(|e| eprintln!("upstream failed: {}", e));
/// ```
pub struct Callbacks<V> {
    on_value: ValueFn<V>,
    on_complete: Option<CompleteFn>,
    on_fail: Option<FailFn>,
}

impl<V: 'static> Callbacks<V> {
    pub fn new(mut f: impl FnMut(&V) -> anyhow::Result<()> + 'static) -> Self {
        Self {
            on_value: Box::new(move |v: &V, _: &mut Graph<V>| f(v)),
            on_complete: None,
            on_fail: None,
        }
    }

    /// Like [`Callbacks::new`], but the closure also gets the graph.
    pub fn with_graph(f: impl FnMut(&V, &mut Graph<V>) -> anyhow::Result<()> + 'static) -> Self {
        Self {
            on_value: Box::new(f),
            on_complete: None,
            on_fail: None,
        }
    }

    pub fn on_complete(mut self, f: impl FnMut() -> anyhow::Result<()> + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn on_fail(mut self, f: impl FnMut(&anyhow::Error) + 'static) -> Self {
        self.on_fail = Some(Box::new(f));
        self
    }
}

impl<V> Receiver<V> for Callbacks<V> {
    fn receive(&mut self, value: &V, graph: &mut Graph<V>) -> anyhow::Result<()> {
        (self.on_value)(value, graph)
    }

    fn complete(&mut self) -> anyhow::Result<()> {
        match self.on_complete.as_mut() {
            Some(f) => f(),
            None => Ok(()),
        }
    }

    fn accepts_failures(&self) -> bool {
        self.on_fail.is_some()
    }

    fn fail(&mut self, error: &anyhow::Error) {
        if let Some(f) = self.on_fail.as_mut() {
            f(error);
        }
    }
}

/// Everything a [`Collector`] has seen.
#[derive(Debug, Clone)]
pub struct Collected<V> {
    pub values: Vec<V>,
    pub completions: usize,
    pub failures: Vec<String>,
}

impl<V> Default for Collected<V> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            completions: 0,
            failures: Vec::new(),
        }
    }
}

/// Receiver that records deliveries into shared storage.
///
/// Cloning a collector yields another handle onto the same record, so one
/// clone can be attached to the graph while the other is inspected.
pub struct Collector<V> {
    record: Rc<RefCell<Collected<V>>>,
    accept_failures: bool,
}

impl<V> Clone for Collector<V> {
    fn clone(&self) -> Self {
        Self {
            record: Rc::clone(&self.record),
            accept_failures: self.accept_failures,
        }
    }
}

impl<V: Clone> Collector<V> {
    /// Collector without a failure handler.
    pub fn new() -> Self {
        Self {
            record: Rc::new(RefCell::new(Collected::default())),
            accept_failures: false,
        }
    }

    /// Collector that accepts (and records) failures.
    pub fn accepting_failures() -> Self {
        Self {
            accept_failures: true,
            ..Self::new()
        }
    }

    pub fn values(&self) -> Vec<V> {
        self.record.borrow().values.clone()
    }

    pub fn completions(&self) -> usize {
        self.record.borrow().completions
    }

    pub fn failures(&self) -> Vec<String> {
        self.record.borrow().failures.clone()
    }

    pub fn snapshot(&self) -> Collected<V> {
        self.record.borrow().clone()
    }
}

impl<V: Clone> Default for Collector<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Receiver<V> for Collector<V> {
    fn receive(&mut self, value: &V, _graph: &mut Graph<V>) -> anyhow::Result<()> {
        self.record.borrow_mut().values.push(value.clone());
        Ok(())
    }

    fn complete(&mut self) -> anyhow::Result<()> {
        self.record.borrow_mut().completions += 1;
        Ok(())
    }

    fn accepts_failures(&self) -> bool {
        self.accept_failures
    }

    fn fail(&mut self, error: &anyhow::Error) {
        self.record.borrow_mut().failures.push(error.to_string());
    }
}

/// Arena slot holding one node.
pub struct NodeSlot<V> {
    pub name: String,
    pub state: NodeState,
    pub parent: Option<NodeId>,
    /// Downstream nodes in attach order.
    pub children: Vec<NodeId>,
    pub transform: Option<Box<dyn Transform<V>>>,
    pub receiver: Option<Box<dyn Receiver<V>>>,
    /// True while `receiver` is lent out for a call.
    pub receiver_busy: bool,
    /// Node completed while its receiver was busy; complete it on return.
    pub complete_pending: bool,
    /// Captured from the receiver at creation, readable while it is lent out.
    pub accepts_failures: bool,
    /// Failure that arrived while the receiver was busy; delivered on return.
    pub fail_pending: Option<anyhow::Error>,
    /// Last dispatched value. `None` until the first delivery.
    pub last: Option<V>,
}

impl<V> NodeSlot<V> {
    pub fn new(
        name: String,
        parent: Option<NodeId>,
        receiver: Option<Box<dyn Receiver<V>>>,
        transform: Option<Box<dyn Transform<V>>>,
    ) -> Self {
        let accepts_failures = receiver.as_ref().is_some_and(|r| r.accepts_failures());
        Self {
            name,
            state: NodeState::Idle,
            parent,
            children: Vec::new(),
            transform,
            receiver,
            receiver_busy: false,
            complete_pending: false,
            accepts_failures,
            fail_pending: None,
            last: None,
        }
    }

    /// Whether a receiver was attached with this node (even if currently lent out).
    pub fn has_receiver(&self) -> bool {
        self.receiver.is_some() || self.receiver_busy
    }

    /// Release everything the node holds except its name, state and last value.
    pub fn release(&mut self, state: NodeState) -> Vec<NodeId> {
        self.state = state;
        self.parent = None;
        self.transform = None;
        self.receiver = None;
        std::mem::take(&mut self.children)
    }
}
