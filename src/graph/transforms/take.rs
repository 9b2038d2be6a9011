//! Take / TakeWhile: end the stream early.

use crate::graph::transform::{Step, Transform};

/// Forwards the first `limit` values, then reduces.
pub struct Take {
    limit: usize,
    seen: usize,
}

impl Take {
    pub fn new(limit: usize) -> Self {
        Self { limit, seen: 0 }
    }
}

impl<V> Transform<V> for Take {
    fn step(&mut self, acc: &mut Vec<V>, input: V) -> anyhow::Result<Step> {
        if self.seen < self.limit {
            self.seen += 1;
            acc.push(input);
        }
        if self.seen >= self.limit {
            Ok(Step::Reduced)
        } else {
            Ok(Step::Continue)
        }
    }
}

/// Forwards values while the predicate holds. The first failing value is
/// dropped and ends the stream.
pub struct TakeWhile<F> {
    pred: F,
}

impl<F> TakeWhile<F> {
    pub fn new(pred: F) -> Self {
        Self { pred }
    }
}

impl<V, F> Transform<V> for TakeWhile<F>
where
    F: FnMut(&V) -> bool,
{
    fn step(&mut self, acc: &mut Vec<V>, input: V) -> anyhow::Result<Step> {
        if (self.pred)(&input) {
            acc.push(input);
            Ok(Step::Continue)
        } else {
            Ok(Step::Reduced)
        }
    }
}
