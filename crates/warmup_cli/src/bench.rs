//! `warmup benchmark`: stage timings over repeated iterations.

use std::fmt::Write as _;

use warmup_pipeline::{BenchmarkReport, Timing};

use crate::pipeline::{build_pipeline, emit_output, human_bytes};
use crate::{BenchmarkArgs, GlobalArgs, ReportFormat};

/// Runs the `warmup benchmark` command.
pub fn run(args: &BenchmarkArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let pipeline = build_pipeline(&args.root, global)?;
    if !global.quiet {
        eprintln!(
            "   Benchmarking {} ({} iteration(s), {} threads)",
            args.root.display(),
            args.iterations.max(1),
            pipeline.threads()
        );
    }
    let report = pipeline.benchmark(&args.root, args.iterations)?;

    let content = match args.format {
        ReportFormat::Text => render(&report).trim_end().to_string(),
        ReportFormat::Json => serde_json::to_string_pretty(&report)?,
    };
    emit_output(args.output.as_deref(), &content)?;
    Ok(0)
}

fn render(report: &BenchmarkReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} asset(s), {} per iteration, {} iteration(s)",
        report.assets,
        human_bytes(report.total_bytes),
        report.iterations
    );
    let _ = writeln!(
        out,
        "{:<12} {:>10} {:>10} {:>10} {:>12}",
        "stage", "mean ms", "min ms", "max ms", "MiB/s"
    );
    let rows: [(&str, &Timing); 3] = [
        ("scan", &report.scan),
        ("exhaustive", &report.exhaustive),
        ("sampled", &report.sampled),
    ];
    for (stage, t) in rows {
        let _ = writeln!(
            out,
            "{:<12} {:>10.2} {:>10.2} {:>10.2} {:>12.1}",
            stage,
            t.mean_ms,
            t.min_ms,
            t.max_ms,
            t.throughput_mib_s(report.total_bytes)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_has_one_row_per_stage() {
        let t = Timing {
            mean_ms: 1.0,
            min_ms: 0.5,
            max_ms: 2.0,
        };
        let report = BenchmarkReport {
            iterations: 3,
            assets: 2,
            total_bytes: 1024,
            scan: t,
            exhaustive: t,
            sampled: t,
        };
        let text = render(&report);
        assert_eq!(text.lines().count(), 5);
        assert!(text.lines().nth(3).unwrap().starts_with("exhaustive"));
    }
}
