//! Filter: forwards only values matching a predicate.

use crate::graph::transform::{Step, Transform};

pub struct Filter<F> {
    pred: F,
}

impl<F> Filter<F> {
    pub fn new(pred: F) -> Self {
        Self { pred }
    }
}

impl<V, F> Transform<V> for Filter<F>
where
    F: FnMut(&V) -> bool,
{
    fn step(&mut self, acc: &mut Vec<V>, input: V) -> anyhow::Result<Step> {
        if (self.pred)(&input) {
            acc.push(input);
        }
        Ok(Step::Continue)
    }
}
