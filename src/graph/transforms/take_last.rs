//! TakeLast: buffers the most recent `n` values and only emits them when
//! the stream completes.

use crate::graph::transform::{Step, Transform};
use std::collections::VecDeque;

pub struct TakeLast<V> {
    n: usize,
    buf: VecDeque<V>,
}

impl<V> TakeLast<V> {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            buf: VecDeque::with_capacity(n),
        }
    }
}

impl<V> Transform<V> for TakeLast<V> {
    fn step(&mut self, _acc: &mut Vec<V>, input: V) -> anyhow::Result<Step> {
        if self.n == 0 {
            return Ok(Step::Continue);
        }
        if self.buf.len() == self.n {
            self.buf.pop_front();
        }
        self.buf.push_back(input);
        Ok(Step::Continue)
    }

    fn complete(&mut self, acc: &mut Vec<V>) -> anyhow::Result<()> {
        acc.extend(self.buf.drain(..));
        Ok(())
    }
}
