//! Per-node reduction step.
//!
//! A transform turns one incoming value into zero, one or many outgoing
//! values. The graph seeds a fresh accumulator with [`Transform::init`] for
//! every push, so outputs never leak between calls; state that must survive
//! between pushes (counters, buffers) lives in the transform itself.
//!
//! `step` may return [`Step::Reduced`] to end the stream: the node dispatches
//! what was produced for that call and then completes.

/// Outcome of a single `step` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// Stream ends after this call's outputs are dispatched.
    Reduced,
}

impl Step {
    #[inline]
    pub fn is_reduced(self) -> bool {
        self == Step::Reduced
    }
}

/// init / step / complete triple.
pub trait Transform<V> {
    /// Fresh accumulator.
    fn init(&mut self) -> Vec<V> {
        Vec::new()
    }

    /// Consume `input`, appending outputs to `acc`.
    fn step(&mut self, acc: &mut Vec<V>, input: V) -> anyhow::Result<Step>;

    /// Flush buffered trailing outputs into `acc` at end of stream.
    fn complete(&mut self, _acc: &mut Vec<V>) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Left-to-right composition of transforms.
///
/// `Compose::new(vec![a, b])` feeds every output of `a` into `b`. If any stage
/// reduces, the composed transform reduces.
pub struct Compose<V> {
    stages: Vec<Box<dyn Transform<V>>>,
}

impl<V> Compose<V> {
    pub fn new(stages: Vec<Box<dyn Transform<V>>>) -> Self {
        Self { stages }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

fn feed<V>(stages: &mut [Box<dyn Transform<V>>], acc: &mut Vec<V>, input: V) -> anyhow::Result<Step> {
    let Some((head, rest)) = stages.split_first_mut() else {
        acc.push(input);
        return Ok(Step::Continue);
    };

    let mut out = head.init();
    let mut step = head.step(&mut out, input)?;
    for value in out {
        if feed(rest, acc, value)?.is_reduced() {
            step = Step::Reduced;
            break;
        }
    }
    Ok(step)
}

impl<V> Transform<V> for Compose<V> {
    fn step(&mut self, acc: &mut Vec<V>, input: V) -> anyhow::Result<Step> {
        feed(&mut self.stages, acc, input)
    }

    fn complete(&mut self, acc: &mut Vec<V>) -> anyhow::Result<()> {
        // Flush stages front to back; each flush still runs through the later stages.
        for i in 0..self.stages.len() {
            let (done, rest) = self.stages.split_at_mut(i + 1);
            let stage = &mut done[i];
            let mut out = stage.init();
            stage.complete(&mut out)?;
            for value in out {
                if feed(rest, acc, value)?.is_reduced() {
                    break;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::transforms::{Filter, Map, Take, TakeLast};

    #[test]
    fn test_compose_feeds_left_to_right() {
        let mut xf: Compose<i32> = Compose::new(vec![
            Box::new(Map::new(|x: i32| x * 10)),
            Box::new(Filter::new(|x: &i32| *x > 15)),
        ]);

        let mut acc = xf.init();
        assert_eq!(xf.step(&mut acc, 1).unwrap(), Step::Continue);
        assert!(acc.is_empty());

        let mut acc = xf.init();
        xf.step(&mut acc, 2).unwrap();
        assert_eq!(acc, vec![20]);
    }

    #[test]
    fn test_compose_reduces_when_inner_stage_reduces() {
        let mut xf: Compose<i32> = Compose::new(vec![
            Box::new(Map::new(|x: i32| x + 1)),
            Box::new(Take::new(2)),
        ]);

        let mut acc = Vec::new();
        assert_eq!(xf.step(&mut acc, 0).unwrap(), Step::Continue);
        assert_eq!(xf.step(&mut acc, 1).unwrap(), Step::Reduced);
        assert_eq!(acc, vec![1, 2]);
    }

    #[test]
    fn test_compose_complete_flushes_through_later_stages() {
        let mut xf: Compose<i32> = Compose::new(vec![
            Box::new(TakeLast::new(2)),
            Box::new(Map::new(|x: i32| x * 2)),
        ]);

        for x in 1..=4 {
            let mut acc = xf.init();
            xf.step(&mut acc, x).unwrap();
            assert!(acc.is_empty());
        }

        let mut acc = xf.init();
        xf.complete(&mut acc).unwrap();
        assert_eq!(acc, vec![6, 8]);
    }

    #[test]
    fn test_empty_compose_is_identity() {
        let mut xf: Compose<&str> = Compose::new(Vec::new());
        assert!(xf.is_empty());
        let mut acc = Vec::new();
        xf.step(&mut acc, "a").unwrap();
        assert_eq!(acc, vec!["a"]);
    }
}
