//! Deterministic load ordering with cycle breaking.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracing::{debug, warn};
use warmup_diagnostics::{Diagnostic, DiagnosticCode};

use crate::graph::DependencyGraph;

/// A total order of asset paths in which every dependency precedes its dependents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOrder(Vec<String>);

impl LoadOrder {
    /// Wraps an already ordered path list.
    pub fn from_paths(paths: Vec<String>) -> Self {
        Self(paths)
    }

    /// The ordered paths.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of assets in the order.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the order is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the paths in load order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Unwraps into the path list.
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    /// Checks that the order covers every node once and that every edge's
    /// dependency precedes its dependent.
    pub fn is_consistent_with(&self, graph: &DependencyGraph) -> bool {
        if self.0.len() != graph.node_count() {
            return false;
        }
        let mut rank = vec![usize::MAX; graph.node_count()];
        for (pos, path) in self.0.iter().enumerate() {
            match graph.index.get(path) {
                Some(node) if rank[node.index()] == usize::MAX => rank[node.index()] = pos,
                _ => return false,
            }
        }
        graph
            .graph
            .edge_references()
            .all(|e| rank[e.target().index()] < rank[e.source().index()])
    }
}

impl DependencyGraph {
    /// Computes the load order, breaking cycles as needed.
    ///
    /// Repeatedly emits the ready asset (all dependencies emitted) with the
    /// smallest path. When nothing is ready, the smallest-path asset lying on
    /// a cycle loses its outgoing in-cycle edge with the smallest target, a
    /// [`DiagnosticCode::CYCLE_BROKEN`] diagnostic is recorded, and ordering
    /// resumes. Removed edges are gone from the graph afterwards, so the graph
    /// is acyclic once this returns.
    pub fn topo_order(&mut self) -> (LoadOrder, Vec<Diagnostic>) {
        let n = self.graph.node_count();
        let mut pending: Vec<usize> = (0..n)
            .map(|i| {
                self.graph
                    .neighbors_directed(NodeIndex::new(i), Direction::Outgoing)
                    .count()
            })
            .collect();
        let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
            .filter(|&i| pending[i] == 0)
            .map(Reverse)
            .collect();
        let mut order = Vec::with_capacity(n);
        let mut diagnostics = Vec::new();
        // Cyclic components keyed by their smallest node, computed on the
        // first stall. Only the component that lost an edge is re-split.
        let mut cycles: Option<BTreeMap<NodeIndex, Vec<NodeIndex>>> = None;

        while order.len() < n {
            if let Some(Reverse(i)) = ready.pop() {
                order.push(self.graph[NodeIndex::new(i)].path.clone());
                for dependent in self
                    .graph
                    .neighbors_directed(NodeIndex::new(i), Direction::Incoming)
                {
                    let d = dependent.index();
                    pending[d] -= 1;
                    if pending[d] == 0 {
                        ready.push(Reverse(d));
                    }
                }
                continue;
            }

            let components = cycles.get_or_insert_with(|| self.cyclic_components());
            let Some((from, component)) = components.pop_first() else {
                // Unreachable for a consistent graph: a stall implies a cycle.
                break;
            };
            let Some(to) = self
                .graph
                .neighbors_directed(from, Direction::Outgoing)
                .filter(|t| component.binary_search(t).is_ok())
                .min()
            else {
                break;
            };
            if let Some(edge) = self.graph.find_edge(from, to) {
                self.graph.remove_edge(edge);
            }
            components.extend(self.split_cyclic(&component));
            let members: Vec<String> = component
                .iter()
                .map(|&m| self.graph[m].path.clone())
                .collect();
            let from_path = self.graph[from].path.clone();
            let to_path = self.graph[to].path.clone();
            warn!(from = %from_path, to = %to_path, "breaking dependency cycle");

            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::CYCLE_BROKEN,
                    format!("dependency cycle broken by dropping edge to {to_path}"),
                )
                .with_path(from_path)
                .with_note(format!("cycle members: {}", members.join(", "))),
            );

            let f = from.index();
            pending[f] -= 1;
            if pending[f] == 0 {
                ready.push(Reverse(f));
            }
        }

        debug!(
            ordered = order.len(),
            cycles_broken = diagnostics.len(),
            "load order computed"
        );
        (LoadOrder(order), diagnostics)
    }

    // Every strongly connected component that contains a cycle, sorted and
    // keyed by its smallest node. The smallest unplaced node on a cycle is
    // always the first key.
    fn cyclic_components(&self) -> BTreeMap<NodeIndex, Vec<NodeIndex>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter_map(|component| self.as_cycle(component))
            .collect()
    }

    // Recomputes the cyclic components inside `members` (sorted) after one of
    // its edges was removed. Components elsewhere in the graph are unaffected.
    fn split_cyclic(&self, members: &[NodeIndex]) -> Vec<(NodeIndex, Vec<NodeIndex>)> {
        let mut local: DiGraph<NodeIndex, ()> = DiGraph::with_capacity(members.len(), 0);
        let ids: Vec<NodeIndex> = members.iter().map(|&m| local.add_node(m)).collect();
        for (i, &m) in members.iter().enumerate() {
            for t in self.graph.neighbors_directed(m, Direction::Outgoing) {
                if let Ok(j) = members.binary_search(&t) {
                    local.add_edge(ids[i], ids[j], ());
                }
            }
        }
        tarjan_scc(&local)
            .into_iter()
            .filter_map(|component| {
                self.as_cycle(component.into_iter().map(|l| local[l]).collect())
            })
            .collect()
    }

    fn as_cycle(&self, mut component: Vec<NodeIndex>) -> Option<(NodeIndex, Vec<NodeIndex>)> {
        component.sort();
        let &head = component.first()?;
        let cyclic = component.len() > 1 || self.graph.find_edge(head, head).is_some();
        cyclic.then_some((head, component))
    }
}
