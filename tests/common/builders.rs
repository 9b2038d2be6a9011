//! Graph builders for tests

use dataflow_rs::graph::{Attach, Graph, NodeId};
use dataflow_rs::GraphConfig;

/// Graph whose default unhandled sink stays silent.
pub fn quiet_graph() -> Graph<i32> {
    Graph::with_config(GraphConfig {
        log_unhandled: false,
        ..GraphConfig::default()
    })
}

/// Builder for a linear chain of identity nodes below a fresh root.
pub struct ChainBuilder {
    depth: usize,
    name_prefix: String,
}

impl ChainBuilder {
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            name_prefix: "link".to_string(),
        }
    }

    pub fn name_prefix(mut self, prefix: &str) -> Self {
        self.name_prefix = prefix.to_string();
        self
    }

    /// Returns the root followed by every node of the chain, top to bottom.
    pub fn build(self, graph: &mut Graph<i32>) -> Vec<NodeId> {
        let root = graph.source_named(format!("{}-root", self.name_prefix));
        let mut nodes = vec![root];
        for i in 0..self.depth {
            let parent = nodes[nodes.len() - 1];
            let node = graph
                .attach(
                    parent,
                    Attach::new().named(format!("{}-{}", self.name_prefix, i)),
                )
                .expect("chain link attaches");
            nodes.push(node);
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_builder() {
        let mut graph = quiet_graph();
        let nodes = ChainBuilder::new(3).name_prefix("c").build(&mut graph);

        assert_eq!(nodes.len(), 4);
        assert_eq!(graph.name(nodes[0]).unwrap(), "c-root");
        assert_eq!(graph.parent(nodes[3]).unwrap(), Some(nodes[2]));
    }
}
