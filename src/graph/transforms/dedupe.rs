//! Dedupe: drops values equal to the previously forwarded one.

use crate::graph::transform::{Step, Transform};

pub struct Dedupe<V> {
    prev: Option<V>,
}

impl<V> Dedupe<V> {
    pub fn new() -> Self {
        Self { prev: None }
    }
}

impl<V> Default for Dedupe<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: PartialEq + Clone> Transform<V> for Dedupe<V> {
    fn step(&mut self, acc: &mut Vec<V>, input: V) -> anyhow::Result<Step> {
        if self.prev.as_ref() != Some(&input) {
            self.prev = Some(input.clone());
            acc.push(input);
        }
        Ok(Step::Continue)
    }
}
