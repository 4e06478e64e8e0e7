//! Asset dependency graph construction, ordering, and export.
//!
//! [`DependencyGraph::build`] turns scanned records plus resolved references
//! into a graph whose edges point from dependent to dependency.
//! [`DependencyGraph::topo_order`] derives a deterministic load order,
//! breaking cycles one edge at a time under a fixed tie-breaking rule.
//! [`DependencyGraph::mark_startup_critical`] flags everything an entry asset
//! transitively depends on.

#![warn(missing_docs)]

pub mod dot;
pub mod graph;
pub mod order;
pub mod resolve;
pub mod stats;

pub use graph::{DependencyEdge, DependencyGraph};
pub use order::LoadOrder;
pub use resolve::ReferenceResolver;
pub use stats::GraphStats;
