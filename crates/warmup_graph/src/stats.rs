//! Summary statistics over a dependency graph.

use petgraph::algo::toposort;
use petgraph::Direction;

use crate::graph::DependencyGraph;

/// Shape summary of a dependency graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    /// Number of assets.
    pub nodes: usize,
    /// Number of dependency edges.
    pub edges: usize,
    /// Startup-critical assets.
    pub critical: usize,
    /// Assets nothing depends on.
    pub roots: usize,
    /// Assets with no dependencies.
    pub leaves: usize,
    /// Edges on the longest dependency chain, or `None` while the graph still has cycles.
    pub max_depth: Option<usize>,
}

impl DependencyGraph {
    /// Computes [`GraphStats`].
    pub fn stats(&self) -> GraphStats {
        let g = &self.graph;
        let roots = g
            .node_indices()
            .filter(|&n| g.neighbors_directed(n, Direction::Incoming).next().is_none())
            .count();
        let leaves = g
            .node_indices()
            .filter(|&n| g.neighbors_directed(n, Direction::Outgoing).next().is_none())
            .count();
        GraphStats {
            nodes: g.node_count(),
            edges: g.edge_count(),
            critical: self.critical_count(),
            roots,
            leaves,
            max_depth: self.max_depth(),
        }
    }

    /// Length in edges of the longest dependency chain.
    ///
    /// Returns `None` if the graph contains a cycle.
    pub fn max_depth(&self) -> Option<usize> {
        let sorted = toposort(&self.graph, None).ok()?;
        let mut depth = vec![0usize; self.graph.node_count()];
        // `toposort` puts dependents before dependencies; walk it backwards.
        for &node in sorted.iter().rev() {
            let d = self
                .graph
                .neighbors_directed(node, Direction::Outgoing)
                .map(|dep| depth[dep.index()] + 1)
                .max()
                .unwrap_or(0);
            depth[node.index()] = d;
        }
        Some(depth.into_iter().max().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::tests::graph;

    #[test]
    fn chain_stats() {
        let mut g = graph(&["a", "b", "c", "d"], &[("b", "a"), ("c", "b"), ("d", "a")]);
        g.mark_startup_critical(["c"]);
        let s = g.stats();
        assert_eq!(s.nodes, 4);
        assert_eq!(s.edges, 3);
        assert_eq!(s.critical, 3);
        assert_eq!(s.roots, 2);
        assert_eq!(s.leaves, 1);
        assert_eq!(s.max_depth, Some(2));
    }

    #[test]
    fn cyclic_graph_has_no_depth_until_ordered() {
        let mut g = graph(&["x", "y"], &[("x", "y"), ("y", "x")]);
        assert_eq!(g.stats().max_depth, None);
        g.topo_order();
        assert_eq!(g.stats().max_depth, Some(1));
    }

    #[test]
    fn empty_graph_stats() {
        let g = graph(&[], &[]);
        let s = g.stats();
        assert_eq!(s.nodes, 0);
        assert_eq!(s.max_depth, Some(0));
    }
}
