//! `warmup verify` and `warmup quick-verify`: drift detection against a cache.

use std::fmt::Write as _;

use warmup_cache::read_cache;
use warmup_pipeline::{VerifyMode, VerifyReport};

use crate::pipeline::{build_pipeline, cache_path, emit_output};
use crate::{GlobalArgs, ReportFormat, VerifyArgs};

/// Which verification the command performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Re-fingerprint every asset in the cache's fingerprint mode.
    Full,
    /// Metadata comparison.
    Quick,
}

/// Runs the `warmup verify` or `warmup quick-verify` command.
///
/// Drift is not an error: the exit status is 0 unless `--strict` is set and
/// something changed. An unreadable or invalid cache is fatal.
pub fn run(args: &VerifyArgs, strategy: Strategy, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let pipeline = build_pipeline(&args.root, global)?;
    let path = cache_path(&args.root, args.cache.as_deref());
    let cache = read_cache(&path).map_err(|e| format!("{}: {e}", path.display()))?;

    let mode = match strategy {
        Strategy::Full => VerifyMode::Full,
        Strategy::Quick => VerifyMode::Quick,
    };
    if !global.quiet {
        eprintln!(
            "   Verifying {} against {} ({} mode)",
            args.root.display(),
            path.display(),
            mode.as_str()
        );
    }
    let report = pipeline.verify(&cache, &args.root, mode)?;

    let content = match args.format {
        ReportFormat::Text => render(&report),
        ReportFormat::Json => serde_json::to_string_pretty(&report)?,
    };
    emit_output(args.output.as_deref(), &content)?;

    if !global.quiet {
        if report.is_clean() {
            eprintln!("   Cache is current ({} asset(s))", report.unchanged);
        } else {
            eprintln!("   Cache is stale: {} asset(s) drifted", report.drift_count());
        }
    }
    Ok(if args.strict && !report.is_clean() { 1 } else { 0 })
}

fn render(report: &VerifyReport) -> String {
    let mut out = String::new();
    for (label, paths) in [
        ("changed", &report.changed),
        ("missing", &report.missing),
        ("added", &report.added),
    ] {
        for path in paths {
            let _ = writeln!(out, "{label:<8} {path}");
        }
    }
    let _ = writeln!(
        out,
        "unchanged: {}, changed: {}, missing: {}, added: {}",
        report.unchanged,
        report.changed.len(),
        report.missing.len(),
        report.added.len()
    );
    out.truncate(out.trim_end().len());
    out
}
