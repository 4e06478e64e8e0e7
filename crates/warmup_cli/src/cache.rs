//! `warmup cache` and `warmup turbo`: build and persist a startup cache.

use warmup_pipeline::RunMode;

use crate::pipeline::{build_pipeline, cache_path, emit_output, human_bytes, render_diagnostics};
use crate::{CacheArgs, GlobalArgs};

/// Fingerprint fidelity of the cache being built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flavor {
    /// Hash every byte.
    Exhaustive,
    /// Hash head, middle, and tail windows only.
    Turbo,
}

impl Flavor {
    fn mode(self) -> RunMode {
        match self {
            Flavor::Exhaustive => RunMode::Cache,
            Flavor::Turbo => RunMode::Turbo,
        }
    }
}

/// Runs the `warmup cache` or `warmup turbo` command.
///
/// An existing file at the destination is kept unless `--force` is given.
/// The cache is written atomically; a failed run leaves any existing cache
/// at the destination untouched.
pub fn run(args: &CacheArgs, flavor: Flavor, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let pipeline = build_pipeline(&args.root, global)?;
    let output = cache_path(&args.root, args.output.as_deref());
    if output.exists() && !args.force {
        if !global.quiet {
            eprintln!(
                "   Cache already exists at {}; pass --force to rebuild",
                output.display()
            );
        }
        return Ok(0);
    }
    if !global.quiet {
        eprintln!(
            "   Building {} cache for {} ({} threads)",
            flavor.mode().as_str(),
            args.root.display(),
            pipeline.threads()
        );
    }

    let (outcome, written) = pipeline.run_and_persist(&args.root, flavor.mode(), &output)?;
    render_diagnostics(&outcome.diagnostics, global);

    if let Some(report_path) = &args.report {
        emit_output(Some(report_path), &outcome.report.to_json()?)?;
    }

    if !global.quiet {
        for (stage, elapsed) in &outcome.timings {
            eprintln!("   {:>11} {:.1} ms", stage, elapsed.as_secs_f64() * 1000.0);
        }
        eprintln!(
            "   Wrote {} ({}): {} asset(s), {} startup-critical",
            output.display(),
            human_bytes(written),
            outcome.report.total_assets,
            outcome.report.startup_critical_count
        );
    }
    Ok(0)
}
