//! MapCat: expands each value into any number of values.

use crate::graph::transform::{Step, Transform};

pub struct MapCat<F> {
    f: F,
}

impl<F> MapCat<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<V, I, F> Transform<V> for MapCat<F>
where
    F: FnMut(V) -> I,
    I: IntoIterator<Item = V>,
{
    fn step(&mut self, acc: &mut Vec<V>, input: V) -> anyhow::Result<Step> {
        acc.extend((self.f)(input));
        Ok(Step::Continue)
    }
}
