//! `warmup graph-export`: Graphviz export of the dependency graph.

use warmup_pipeline::RunMode;

use crate::pipeline::{build_pipeline, emit_output, render_diagnostics};
use crate::{GlobalArgs, GraphExportArgs};

/// Runs the `warmup graph-export` command.
///
/// The exported graph is the one the load order was derived from, so edges
/// removed to break cycles are absent.
pub fn run(args: &GraphExportArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let pipeline = build_pipeline(&args.root, global)?;
    let outcome = pipeline.run(&args.root, RunMode::Analyze)?;
    render_diagnostics(&outcome.diagnostics, global);

    let graph = outcome
        .graph
        .ok_or("analysis produced no dependency graph")?;
    emit_output(args.output.as_deref(), graph.to_dot(args.startup_only).trim_end())?;

    if !global.quiet {
        let stats = graph.stats();
        let depth = stats
            .max_depth
            .map_or_else(|| "n/a".to_string(), |d| d.to_string());
        eprintln!(
            "   Graph: {} node(s), {} edge(s), {} startup-critical, {} root(s), {} leaf(s), max depth {}",
            stats.nodes, stats.edges, stats.critical, stats.roots, stats.leaves, depth
        );
    }
    Ok(0)
}
