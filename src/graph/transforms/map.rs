//! Map: applies a function to every value.

use crate::graph::transform::{Step, Transform};

pub struct Map<F> {
    f: F,
}

impl<F> Map<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<V, F> Transform<V> for Map<F>
where
    F: FnMut(V) -> V,
{
    fn step(&mut self, acc: &mut Vec<V>, input: V) -> anyhow::Result<Step> {
        acc.push((self.f)(input));
        Ok(Step::Continue)
    }
}
