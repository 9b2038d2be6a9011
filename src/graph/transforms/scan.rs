//! Scan: emits the running reduction of all values seen so far.

use crate::graph::transform::{Step, Transform};

pub struct Scan<V, F> {
    acc: V,
    f: F,
}

impl<V, F> Scan<V, F> {
    pub fn new(initial: V, f: F) -> Self {
        Self { acc: initial, f }
    }
}

impl<V, F> Transform<V> for Scan<V, F>
where
    V: Clone,
    F: FnMut(&V, V) -> V,
{
    fn step(&mut self, acc: &mut Vec<V>, input: V) -> anyhow::Result<Step> {
        self.acc = (self.f)(&self.acc, input);
        acc.push(self.acc.clone());
        Ok(Step::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_sum() {
        let mut xf = Scan::new(0, |a: &i64, x: i64| a + x);
        let mut acc = Vec::new();
        for x in [1, 2, 3] {
            xf.step(&mut acc, x).unwrap();
        }
        assert_eq!(acc, vec![1, 3, 6]);
    }
}
