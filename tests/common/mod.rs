//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use dataflow_rs::graph::{Graph, Receiver};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Create a test timeout duration
pub fn test_timeout() -> Duration {
    Duration::from_millis(100)
}

/// One observed delivery, tagged with the receiver that saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Value(&'static str, i32),
    Complete(&'static str),
    Fail(&'static str, String),
}

/// Shared, ordered log of deliveries across many receivers.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Rc<RefCell<Vec<Event>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receiver logging into this recorder under `tag`.
    pub fn tagged(&self, tag: &'static str) -> TaggedReceiver {
        TaggedReceiver {
            tag,
            events: Rc::clone(&self.events),
            accept_failures: false,
        }
    }

    /// Same as `tagged`, but the receiver also accepts failures.
    pub fn tagged_with_fail(&self, tag: &'static str) -> TaggedReceiver {
        TaggedReceiver {
            accept_failures: true,
            ..self.tagged(tag)
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Tags of value deliveries, in order.
    pub fn value_tags(&self) -> Vec<&'static str> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Value(tag, _) => Some(*tag),
                _ => None,
            })
            .collect()
    }

    pub fn count_completions(&self, tag: &'static str) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| **e == Event::Complete(tag))
            .count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

pub struct TaggedReceiver {
    tag: &'static str,
    events: Rc<RefCell<Vec<Event>>>,
    accept_failures: bool,
}

impl Receiver<i32> for TaggedReceiver {
    fn receive(&mut self, value: &i32, _graph: &mut Graph<i32>) -> anyhow::Result<()> {
        self.events.borrow_mut().push(Event::Value(self.tag, *value));
        Ok(())
    }

    fn complete(&mut self) -> anyhow::Result<()> {
        self.events.borrow_mut().push(Event::Complete(self.tag));
        Ok(())
    }

    fn accepts_failures(&self) -> bool {
        self.accept_failures
    }

    fn fail(&mut self, error: &anyhow::Error) {
        self.events
            .borrow_mut()
            .push(Event::Fail(self.tag, error.to_string()));
    }
}
