//! Graph executor: node arena, dispatch engine and lifecycle.
//!
//! All nodes of a graph live in one `Vec<NodeSlot>` and are addressed by
//! `NodeId`. Every operation is synchronous and runs to completion on the
//! caller's stack:
//!
//! 1. `push` runs the value through the node's transform (fresh accumulator).
//! 2. Each output is recorded as the node's last value and multicast to the
//!    children, last-attached first, then to the node's own receiver.
//! 3. Early termination, completion and failure tear nodes down structurally:
//!    completion and failure travel parent → children, detachment travels
//!    child → parent.
//!
//! Cascading operations always iterate over a snapshot of the children, so
//! receivers may rewire the graph while a delivery is in progress.
//!
//! The graph has no internal locking. Producers on other threads must hand
//! their values to the thread owning the graph (see `source::WorkerSource`).

use crate::config::GraphConfig;
use crate::graph::attach::Attach;
use crate::graph::error::{FlowError, FlowResult, UnhandledFailure};
use crate::graph::id::{generate_name, NodeId};
use crate::graph::node::{NodeSlot, NodeState, Receiver};
use crate::graph::transform::{Compose, Transform};

/// Callback receiving failures that no receiver accepted.
pub type UnhandledSink = Box<dyn FnMut(&UnhandledFailure<'_>)>;

fn default_unhandled_sink(log: bool) -> UnhandledSink {
    Box::new(move |failure: &UnhandledFailure<'_>| {
        if log {
            tracing::error!("{}", failure);
        }
    })
}

/// Read-only view of one node, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub name: String,
    pub state: NodeState,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub has_value: bool,
}

/// The dataflow graph.
pub struct Graph<V> {
    slots: Vec<NodeSlot<V>>,
    config: GraphConfig,
    unhandled: UnhandledSink,
}

impl<V: Clone + 'static> Default for Graph<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + 'static> Graph<V> {
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    pub fn with_config(config: GraphConfig) -> Self {
        let unhandled = default_unhandled_sink(config.log_unhandled);
        Self {
            slots: Vec::new(),
            config,
            unhandled,
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Replace the sink that receives unhandled failures.
    pub fn set_unhandled_sink(&mut self, sink: impl FnMut(&UnhandledFailure<'_>) + 'static) {
        self.unhandled = Box::new(sink);
    }

    // ── Inspection ──

    /// Number of nodes ever created (terminated ones included).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of nodes not yet terminated.
    pub fn live_nodes(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| !s.state.is_terminated())
            .count()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.slots.len()
    }

    pub fn state(&self, id: NodeId) -> FlowResult<NodeState> {
        Ok(self.slot(id)?.state)
    }

    pub fn name(&self, id: NodeId) -> FlowResult<&str> {
        Ok(&self.slot(id)?.name)
    }

    pub fn parent(&self, id: NodeId) -> FlowResult<Option<NodeId>> {
        Ok(self.slot(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> FlowResult<&[NodeId]> {
        Ok(&self.slot(id)?.children)
    }

    /// Last value dispatched by the node, `None` before the first one.
    pub fn deref(&self, id: NodeId) -> FlowResult<Option<&V>> {
        Ok(self.slot(id)?.last.as_ref())
    }

    /// First live node with the given name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.slots
            .iter()
            .position(|s| s.name == name && !s.state.is_terminated())
            .map(|i| NodeId(i as u32))
    }

    pub fn snapshot(&self) -> Vec<NodeSnapshot> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, s)| NodeSnapshot {
                id: NodeId(i as u32),
                name: s.name.clone(),
                state: s.state,
                parent: s.parent,
                children: s.children.clone(),
                has_value: s.last.is_some(),
            })
            .collect()
    }

    // ── Wiring ──

    /// Create a root node with a generated name.
    pub fn source(&mut self) -> NodeId {
        let name = generate_name(&self.config.source_id_prefix);
        self.insert(name, None, None, None)
    }

    pub fn source_named(&mut self, name: impl Into<String>) -> NodeId {
        self.insert(name.into(), None, None, None)
    }

    /// Create a root node carrying a receiver and/or transform.
    pub fn add_root(&mut self, attach: Attach<V>) -> FlowResult<NodeId> {
        attach.validate()?;
        if let Some(node) = attach.adopt {
            return Err(FlowError::InvalidWiring(format!(
                "{:?} cannot be adopted without a parent",
                node
            )));
        }
        let pure = attach.is_pure_transform();
        let Attach {
            receiver,
            transform,
            name,
            ..
        } = attach;
        let name = name.unwrap_or_else(|| self.generated_name(pure));
        Ok(self.insert(name, None, receiver, transform))
    }

    /// Hang a new (or adopted) node below `parent`.
    ///
    /// If `parent` already dispatched a value, that value is replayed into the
    /// new child before this returns.
    pub fn attach(&mut self, parent: NodeId, attach: Attach<V>) -> FlowResult<NodeId> {
        attach.validate()?;
        self.live_slot_mut(parent)?;

        let pure = attach.is_pure_transform();
        let Attach {
            receiver,
            transform,
            name,
            adopt,
        } = attach;

        let child = match adopt {
            Some(node) => {
                self.check_adoptable(parent, node)?;
                self.slots[node.index()].parent = Some(parent);
                node
            }
            None => {
                let name = name.unwrap_or_else(|| self.generated_name(pure));
                self.insert(name, Some(parent), receiver, transform)
            }
        };

        let slot = &mut self.slots[parent.index()];
        slot.children.push(child);
        slot.state = NodeState::Active;
        let replay = slot.last.clone();
        tracing::debug!(
            "{} attached below {}",
            self.slots[child.index()].name,
            self.slots[parent.index()].name
        );

        if let Some(value) = replay {
            self.deliver_to_child(child, value);
        }
        Ok(child)
    }

    /// Shorthand for attaching a receiver.
    pub fn subscribe(
        &mut self,
        parent: NodeId,
        receiver: impl Receiver<V> + 'static,
    ) -> FlowResult<NodeId> {
        self.attach(parent, Attach::receiver(receiver))
    }

    /// One child per receiver, in order.
    pub fn attach_all(
        &mut self,
        parent: NodeId,
        receivers: impl IntoIterator<Item = Box<dyn Receiver<V>>>,
    ) -> FlowResult<Vec<NodeId>> {
        receivers
            .into_iter()
            .map(|r| self.attach(parent, Attach::new().with_boxed_receiver(r)))
            .collect()
    }

    /// Child node running `stages` composed left to right.
    pub fn transform(
        &mut self,
        parent: NodeId,
        mut stages: Vec<Box<dyn Transform<V>>>,
        name: Option<&str>,
    ) -> FlowResult<NodeId> {
        let transform: Box<dyn Transform<V>> = if stages.len() == 1 {
            stages.remove(0)
        } else {
            Box::new(Compose::new(stages))
        };
        let mut attach = Attach::new().with_boxed_transform(transform);
        if let Some(name) = name {
            attach = attach.named(name);
        }
        self.attach(parent, attach)
    }

    // ── Values ──

    /// Feed one value into a node.
    ///
    /// Fails with `IllegalState` if the node has terminated. Failures raised
    /// while the value flows downstream are handled inside the graph and do
    /// not surface here.
    pub fn push(&mut self, id: NodeId, value: V) -> FlowResult<()> {
        let slot = self.live_slot_mut(id)?;
        let Some(mut transform) = slot.transform.take() else {
            self.dispatch(id, value);
            return Ok(());
        };

        let mut acc = transform.init();
        let outcome = transform.step(&mut acc, value);
        self.slots[id.index()].transform = Some(transform);

        match outcome {
            Ok(step) => {
                for out in acc {
                    if self.is_terminated(id) {
                        break;
                    }
                    self.dispatch(id, out);
                }
                if step.is_reduced() {
                    tracing::debug!("{} transform reduced", self.slots[id.index()].name);
                    self.complete(id)?;
                }
            }
            Err(error) => self.fail_node(id, &error),
        }
        Ok(())
    }

    /// End the node's stream: flush its transform, complete its receiver and
    /// children, then detach it. A no-op on terminated nodes.
    pub fn complete(&mut self, id: NodeId) -> FlowResult<()> {
        let slot = self.slot_mut(id)?;
        if slot.state.is_terminated() {
            return Ok(());
        }
        tracing::debug!("{} complete", slot.name);

        if let Some(mut transform) = slot.transform.take() {
            let mut acc = transform.init();
            let flushed = transform.complete(&mut acc);
            // Restored before dispatch so reentrant pushes still run through it.
            self.slots[id.index()].transform = Some(transform);
            if let Err(error) = flushed {
                self.fail_node(id, &error);
                return Ok(());
            }
            for value in acc {
                if self.is_terminated(id) {
                    break;
                }
                self.dispatch(id, value);
            }
        }
        if self.is_terminated(id) {
            return Ok(());
        }

        let slot = &mut self.slots[id.index()];
        slot.state = NodeState::Done;
        let children = slot.children.clone();

        self.complete_receiver(id);
        for child in children {
            if self.is_child_of(child, id) {
                self.complete(child)?;
            }
        }
        self.detach(id).map(|_| ())
    }

    /// Signal a failure at a node. Allowed in any state.
    pub fn fail(&mut self, id: NodeId, error: anyhow::Error) -> FlowResult<()> {
        self.slot(id)?;
        self.fail_node(id, &error);
        Ok(())
    }

    /// Detach a node from its parent and terminate it (and its subtree).
    ///
    /// If the parent is left without children and has no receiver of its own,
    /// it detaches itself in turn. Returns whether the node was found in its
    /// parent's children (true for roots).
    pub fn detach(&mut self, id: NodeId) -> FlowResult<bool> {
        let parent = self.slot(id)?.parent;
        let removed = match parent {
            Some(p) => self.remove_child(p, id),
            None => true,
        };
        self.teardown(id);
        Ok(removed)
    }

    /// Detach `child` if it hangs directly below `parent`.
    pub fn detach_child(&mut self, parent: NodeId, child: NodeId) -> FlowResult<bool> {
        self.slot(parent)?;
        if self.slot(child)?.parent != Some(parent) {
            return Ok(false);
        }
        self.detach(child)
    }

    // ── Dispatch internals ──

    fn dispatch(&mut self, id: NodeId, value: V) {
        let slot = &mut self.slots[id.index()];
        if self.config.trace_dispatch {
            tracing::trace!("{} dispatch to {} children", slot.name, slot.children.len());
        }
        slot.last = Some(value.clone());
        let children = slot.children.clone();

        // Last attached is notified first.
        for &child in children.iter().rev() {
            if self.is_child_of(child, id) {
                self.deliver_to_child(child, value.clone());
            }
        }
        self.deliver_to_receiver(id, &value);
    }

    fn deliver_to_child(&mut self, child: NodeId, value: V) {
        if let Err(e) = self.push(child, value) {
            let error = anyhow::Error::from(e);
            self.fail_node(child, &error);
        }
    }

    fn deliver_to_receiver(&mut self, id: NodeId, value: &V) {
        let slot = &mut self.slots[id.index()];
        if slot.state.is_terminated() {
            return;
        }
        if slot.receiver_busy {
            tracing::warn!(
                "{} receiver is still handling a value, skipping reentrant delivery",
                slot.name
            );
            return;
        }
        let Some(mut receiver) = slot.receiver.take() else {
            return;
        };
        slot.receiver_busy = true;

        let result = receiver.receive(value, self);
        self.slots[id.index()].receiver_busy = false;

        match result {
            Ok(()) => self.return_receiver(id, receiver),
            Err(error) if receiver.accepts_failures() => {
                receiver.fail(&error);
                self.return_receiver(id, receiver);
            }
            Err(error) => {
                self.return_receiver(id, receiver);
                self.fail_node(id, &error);
            }
        }
    }

    fn return_receiver(&mut self, id: NodeId, mut receiver: Box<dyn Receiver<V>>) {
        let slot = &mut self.slots[id.index()];
        if !slot.state.is_terminated() {
            slot.receiver = Some(receiver);
            return;
        }
        // Terminated while the receiver was busy.
        if let Some(error) = slot.fail_pending.take() {
            receiver.fail(&error);
        }
        if std::mem::take(&mut slot.complete_pending) {
            self.complete_receiver_now(id, receiver);
        }
    }

    fn complete_receiver(&mut self, id: NodeId) {
        let slot = &mut self.slots[id.index()];
        if slot.receiver_busy {
            slot.complete_pending = true;
            return;
        }
        if let Some(receiver) = slot.receiver.take() {
            self.complete_receiver_now(id, receiver);
        }
    }

    fn complete_receiver_now(&mut self, id: NodeId, mut receiver: Box<dyn Receiver<V>>) {
        if let Err(error) = receiver.complete() {
            if receiver.accepts_failures() {
                receiver.fail(&error);
            } else {
                self.report_unhandled(id, &error);
            }
        }
    }

    // ── Lifecycle internals ──

    fn fail_node(&mut self, id: NodeId, error: &anyhow::Error) {
        let Some(slot) = self.slots.get_mut(id.index()) else {
            return;
        };
        tracing::debug!("{} failed: {}", slot.name, error);
        slot.state = NodeState::Error;

        let mut handled = false;
        if slot.receiver_busy {
            // Delivered once the receiver returns from its current call.
            if slot.accepts_failures {
                slot.fail_pending = Some(anyhow::Error::msg(error.to_string()));
                handled = true;
            }
        } else if let Some(receiver) = slot.receiver.as_mut() {
            if receiver.accepts_failures() {
                receiver.fail(error);
                handled = true;
            }
        }
        let children = slot.children.clone();
        for child in children {
            if self.is_child_of(child, id) {
                self.fail_node(child, error);
                handled = true;
            }
        }

        if !handled {
            self.report_unhandled(id, error);
        }
        self.unlink(id);
    }

    fn report_unhandled(&mut self, id: NodeId, error: &anyhow::Error) {
        let failure = UnhandledFailure {
            node: id,
            name: &self.slots[id.index()].name,
            error,
        };
        (self.unhandled)(&failure);
    }

    /// Remove `child` from `parent`, cascading if `parent` is left empty.
    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let slot = &mut self.slots[parent.index()];
        let Some(pos) = slot.children.iter().position(|&c| c == child) else {
            return false;
        };
        slot.children.remove(pos);

        if slot.children.is_empty() && !slot.has_receiver() && !slot.state.is_terminated() {
            tracing::debug!("{} lost its last child, detaching", slot.name);
            self.unlink(parent);
        }
        true
    }

    fn unlink(&mut self, id: NodeId) {
        if let Some(parent) = self.slots[id.index()].parent {
            self.remove_child(parent, id);
        }
        self.teardown(id);
    }

    fn teardown(&mut self, id: NodeId) {
        let slot = &mut self.slots[id.index()];
        let from = slot.state;
        let to = from.max(NodeState::Done);
        let orphans = slot.release(to);
        if from != to {
            tracing::debug!("{} {:?} -> {:?}", slot.name, from, to);
        }
        for child in orphans {
            if self.slots[child.index()].parent == Some(id) {
                self.teardown(child);
            }
        }
    }

    // ── Helpers ──

    fn insert(
        &mut self,
        name: String,
        parent: Option<NodeId>,
        receiver: Option<Box<dyn Receiver<V>>>,
        transform: Option<Box<dyn Transform<V>>>,
    ) -> NodeId {
        // TODO: recycle terminated slots once NodeId carries a generation tag.
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(NodeSlot::new(name, parent, receiver, transform));
        id
    }

    fn generated_name(&self, pure_transform: bool) -> String {
        if pure_transform {
            generate_name(&self.config.transform_id_prefix)
        } else {
            generate_name(&self.config.receiver_id_prefix)
        }
    }

    fn check_adoptable(&self, parent: NodeId, node: NodeId) -> FlowResult<()> {
        let slot = self.slot(node)?;
        if slot.state.is_terminated() {
            return Err(FlowError::IllegalState {
                node,
                state: slot.state,
            });
        }
        if slot.parent.is_some() {
            return Err(FlowError::InvalidWiring(format!(
                "{:?} already has a parent",
                node
            )));
        }
        // Walk up from the new parent; meeting `node` means a cycle.
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == node {
                return Err(FlowError::InvalidWiring(format!(
                    "attaching {:?} below {:?} would create a cycle",
                    node, parent
                )));
            }
            cursor = self.slots[current.index()].parent;
        }
        Ok(())
    }

    fn slot(&self, id: NodeId) -> FlowResult<&NodeSlot<V>> {
        self.slots.get(id.index()).ok_or(FlowError::UnknownNode(id))
    }

    fn slot_mut(&mut self, id: NodeId) -> FlowResult<&mut NodeSlot<V>> {
        self.slots.get_mut(id.index()).ok_or(FlowError::UnknownNode(id))
    }

    fn live_slot_mut(&mut self, id: NodeId) -> FlowResult<&mut NodeSlot<V>> {
        let slot = self.slot_mut(id)?;
        if slot.state.is_terminated() {
            return Err(FlowError::IllegalState {
                node: id,
                state: slot.state,
            });
        }
        Ok(slot)
    }

    fn is_terminated(&self, id: NodeId) -> bool {
        self.slots
            .get(id.index())
            .map_or(true, |s| s.state.is_terminated())
    }

    fn is_child_of(&self, child: NodeId, parent: NodeId) -> bool {
        self.slots
            .get(child.index())
            .is_some_and(|s| s.parent == Some(parent) && !s.state.is_terminated())
    }
}
