//! The asset dependency graph.

use std::collections::BTreeMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use tracing::debug;
use warmup_common::AssetRecord;
use warmup_diagnostics::{Diagnostic, DiagnosticCode};

/// A directed reference from a dependent asset to the asset it needs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DependencyEdge {
    /// The asset that declares the reference.
    pub dependent: String,
    /// The asset it depends on.
    pub dependency: String,
}

/// Assets and their dependency edges.
///
/// Nodes are stored in path order, so a node's index is also its rank in the
/// sorted path set. Edges point from dependent to dependency, are unique per
/// pair, and always join two nodes present in the graph.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    pub(crate) graph: DiGraph<AssetRecord, ()>,
    pub(crate) index: BTreeMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Builds a graph from records and candidate edges.
    ///
    /// Records with duplicate paths keep the first occurrence. Edges whose
    /// dependency is not a record are dropped and reported as dangling
    /// references; edges whose dependent is not a record are dropped silently.
    pub fn build(
        records: Vec<AssetRecord>,
        edges: impl IntoIterator<Item = DependencyEdge>,
    ) -> (Self, Vec<Diagnostic>) {
        let mut by_path: BTreeMap<String, AssetRecord> = BTreeMap::new();
        for record in records {
            by_path.entry(record.path.clone()).or_insert(record);
        }

        let mut graph = DiGraph::with_capacity(by_path.len(), 0);
        let mut index = BTreeMap::new();
        for (path, record) in by_path {
            let node = graph.add_node(record);
            index.insert(path, node);
        }

        let mut dangling = Vec::new();
        let mut sorted: Vec<DependencyEdge> = edges.into_iter().collect();
        sorted.sort();
        sorted.dedup();
        for edge in sorted {
            let Some(&from) = index.get(&edge.dependent) else {
                continue;
            };
            let Some(&to) = index.get(&edge.dependency) else {
                dangling.push(
                    Diagnostic::new(
                        DiagnosticCode::DANGLING_REFERENCE,
                        format!("reference to missing asset {}", edge.dependency),
                    )
                    .with_path(edge.dependent),
                );
                continue;
            };
            graph.update_edge(from, to, ());
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            dangling = dangling.len(),
            "graph built"
        );
        (Self { graph, index }, dangling)
    }

    /// Number of assets.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct dependency edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns `true` if `path` is a node.
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Returns the record for `path`.
    pub fn record(&self, path: &str) -> Option<&AssetRecord> {
        self.index.get(path).map(|&n| &self.graph[n])
    }

    /// All records in path order.
    pub fn records(&self) -> impl Iterator<Item = &AssetRecord> {
        self.graph.node_weights()
    }

    /// Consumes the graph, returning records in path order.
    pub fn into_records(self) -> Vec<AssetRecord> {
        let (nodes, _) = self.graph.into_nodes_edges();
        nodes.into_iter().map(|n| n.weight).collect()
    }

    /// Mutable access to every record, in path order.
    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut AssetRecord> {
        self.graph.node_weights_mut()
    }

    /// All edges, sorted by dependent then dependency.
    pub fn edges(&self) -> Vec<DependencyEdge> {
        let mut edges: Vec<DependencyEdge> = self
            .graph
            .raw_edges()
            .iter()
            .map(|e| DependencyEdge {
                dependent: self.graph[e.source()].path.clone(),
                dependency: self.graph[e.target()].path.clone(),
            })
            .collect();
        edges.sort();
        edges
    }

    /// Flags every asset reachable from an entry as startup-critical.
    ///
    /// Reachability follows edges forward: an entry and everything it
    /// transitively depends on are critical. Entries not present in the graph
    /// are ignored. Returns the number of critical assets.
    pub fn mark_startup_critical<'a>(&mut self, entries: impl IntoIterator<Item = &'a str>) -> usize {
        let roots: Vec<NodeIndex> = entries
            .into_iter()
            .filter_map(|p| self.index.get(p).copied())
            .collect();
        let mut critical = vec![false; self.graph.node_count()];
        if let Some(&first) = roots.first() {
            let mut dfs = Dfs::new(&self.graph, first);
            for &root in &roots {
                dfs.move_to(root);
                while let Some(node) = dfs.next(&self.graph) {
                    critical[node.index()] = true;
                }
            }
        }
        for (i, record) in self.graph.node_weights_mut().enumerate() {
            record.startup_critical = critical[i];
        }
        critical.iter().filter(|&&c| c).count()
    }

    /// Number of assets currently flagged startup-critical.
    pub fn critical_count(&self) -> usize {
        self.records().filter(|r| r.startup_critical).count()
    }
}
