//! Graphviz export.

use std::fmt::Write;

use petgraph::visit::EdgeRef;

use crate::graph::DependencyGraph;

impl DependencyGraph {
    /// Renders the graph in Graphviz DOT syntax.
    ///
    /// With `startup_only`, only startup-critical assets and the edges between
    /// them are emitted. Output is deterministic: nodes in path order, edges
    /// sorted by dependent then dependency.
    pub fn to_dot(&self, startup_only: bool) -> String {
        let included: Vec<bool> = self
            .graph
            .node_weights()
            .map(|r| !startup_only || r.startup_critical)
            .collect();

        let mut out = String::from("digraph assets {\n    rankdir=LR;\n    node [shape=box];\n");
        for (i, record) in self.graph.node_weights().enumerate() {
            if !included[i] {
                continue;
            }
            let style = if record.startup_critical {
                ", style=filled, fillcolor=lightsalmon"
            } else {
                ""
            };
            let _ = writeln!(
                out,
                "    n{i} [label=\"{}\\n{}\"{style}];",
                escape(&record.path),
                record.kind
            );
        }

        let mut edges: Vec<(usize, usize)> = self
            .graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index()))
            .filter(|&(s, t)| included[s] && included[t])
            .collect();
        edges.sort_unstable();
        for (s, t) in edges {
            let _ = writeln!(out, "    n{s} -> n{t};");
        }
        out.push_str("}\n");
        out
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
