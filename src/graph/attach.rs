//! Wiring configuration for `Graph::attach`.
//!
//! Every way of hanging something below a node goes through one record with
//! named optional parts instead of positional overloads:
//!
//! | fields set              | result                                          |
//! |-------------------------|-------------------------------------------------|
//! | receiver                | new node delivering to the receiver             |
//! | transform               | new pure transform node (chain more below it)   |
//! | receiver + transform    | new node transforming, then delivering          |
//! | nothing                 | new identity node                               |
//! | adopt                   | existing root node re-parented under the target |
//!
//! `name` may be combined with any of the "new node" forms. Adopting cannot be
//! combined with any other field.

use crate::graph::error::{FlowError, FlowResult};
use crate::graph::id::NodeId;
use crate::graph::node::Receiver;
use crate::graph::transform::Transform;

pub struct Attach<V> {
    pub(crate) receiver: Option<Box<dyn Receiver<V>>>,
    pub(crate) transform: Option<Box<dyn Transform<V>>>,
    pub(crate) name: Option<String>,
    pub(crate) adopt: Option<NodeId>,
}

impl<V> Default for Attach<V> {
    fn default() -> Self {
        Self {
            receiver: None,
            transform: None,
            name: None,
            adopt: None,
        }
    }
}

impl<V: 'static> Attach<V> {
    /// Identity node, no receiver.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn receiver(receiver: impl Receiver<V> + 'static) -> Self {
        Self::new().with_receiver(receiver)
    }

    pub fn transform(transform: impl Transform<V> + 'static) -> Self {
        Self::new().with_transform(transform)
    }

    /// Re-parent an existing root node.
    pub fn adopt(node: NodeId) -> Self {
        Self {
            adopt: Some(node),
            ..Self::default()
        }
    }

    pub fn with_receiver(mut self, receiver: impl Receiver<V> + 'static) -> Self {
        self.receiver = Some(Box::new(receiver));
        self
    }

    pub fn with_boxed_receiver(mut self, receiver: Box<dyn Receiver<V>>) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn with_transform(mut self, transform: impl Transform<V> + 'static) -> Self {
        self.transform = Some(Box::new(transform));
        self
    }

    pub fn with_boxed_transform(mut self, transform: Box<dyn Transform<V>>) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Reject combinations that have no single meaning.
    pub fn validate(&self) -> FlowResult<()> {
        if let Some(node) = self.adopt {
            if self.receiver.is_some() || self.transform.is_some() {
                return Err(FlowError::InvalidWiring(format!(
                    "cannot adopt {:?} and also wrap a receiver or transform",
                    node
                )));
            }
            if self.name.is_some() {
                return Err(FlowError::InvalidWiring(format!(
                    "adopted node {:?} keeps its own name",
                    node
                )));
            }
        }
        if matches!(self.name.as_deref(), Some("")) {
            return Err(FlowError::InvalidWiring("empty node name".to_string()));
        }
        Ok(())
    }

    /// Whether this record builds a transform-only node.
    pub(crate) fn is_pure_transform(&self) -> bool {
        self.receiver.is_none() && self.transform.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::Collector;
    use crate::graph::transforms::Take;

    #[test]
    fn test_valid_combinations() {
        assert!(Attach::<i32>::new().validate().is_ok());
        assert!(Attach::receiver(Collector::<i32>::new()).validate().is_ok());
        assert!(Attach::<i32>::transform(Take::new(1))
            .with_receiver(Collector::new())
            .named("take-one")
            .validate()
            .is_ok());
        assert!(Attach::<i32>::adopt(NodeId(3)).validate().is_ok());
    }

    #[test]
    fn test_adopt_is_exclusive() {
        let err = Attach::<i32>::adopt(NodeId(3))
            .with_transform(Take::new(1))
            .validate()
            .unwrap_err();
        assert!(matches!(err, FlowError::InvalidWiring(_)));

        let err = Attach::<i32>::adopt(NodeId(3))
            .named("x")
            .validate()
            .unwrap_err();
        assert!(matches!(err, FlowError::InvalidWiring(_)));
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(Attach::<i32>::new().named("").validate().is_err());
    }

    #[test]
    fn test_pure_transform() {
        assert!(Attach::<i32>::transform(Take::new(1)).is_pure_transform());
        assert!(!Attach::receiver(Collector::<i32>::new()).is_pure_transform());
    }
}
