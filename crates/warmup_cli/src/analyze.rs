//! `warmup scan` and `warmup analyze`.

use std::fmt::Write as _;

use warmup_common::{AssetKind, AssetRecord};
use warmup_pipeline::RunMode;

use crate::pipeline::{build_pipeline, emit_output, human_bytes, render_diagnostics};
use crate::{AnalyzeArgs, GlobalArgs, KindFilter, ReportFormat, ScanArgs};

/// Runs the `warmup scan` command: lists every asset with its kind and size,
/// optionally only those of one kind.
pub fn run_scan(args: &ScanArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let pipeline = build_pipeline(&args.root, global)?;
    if !global.quiet {
        eprintln!("   Scanning {}", args.root.display());
    }
    let outcome = pipeline.run(&args.root, RunMode::Scan)?;
    render_diagnostics(&outcome.diagnostics, global);

    let listed = select(&outcome.records, args.filter.map(KindFilter::kind));
    let content = match args.format {
        ReportFormat::Text => asset_table(&listed),
        ReportFormat::Json => serde_json::to_string_pretty(&listed)?,
    };
    emit_output(args.output.as_deref(), &content)?;

    if !global.quiet {
        eprintln!(
            "   Found {} asset(s), {}",
            listed.len(),
            human_bytes(listed.iter().map(|r| r.size).sum())
        );
    }
    Ok(0)
}

/// Runs the `warmup analyze` command: builds the graph and emits the JSON report.
pub fn run(args: &AnalyzeArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let pipeline = build_pipeline(&args.root, global)?;
    if !global.quiet {
        eprintln!("   Analyzing {}", args.root.display());
    }
    let outcome = pipeline.run(&args.root, RunMode::Analyze)?;
    render_diagnostics(&outcome.diagnostics, global);

    emit_output(args.output.as_deref(), &outcome.report.to_json()?)?;

    if !global.quiet {
        let report = &outcome.report;
        eprintln!(
            "   Analyzed {} asset(s): {} startup-critical, {} edge(s), {} cycle(s) broken",
            report.total_assets, report.startup_critical_count, report.edge_count, report.cycle_count
        );
        if let Some(path) = &args.output {
            eprintln!("   Report written to {}", path.display());
        }
    }
    Ok(0)
}

fn select(records: &[AssetRecord], kind: Option<AssetKind>) -> Vec<&AssetRecord> {
    records
        .iter()
        .filter(|r| kind.map_or(true, |k| r.kind == k))
        .collect()
}

fn asset_table(records: &[&AssetRecord]) -> String {
    let mut out = String::new();
    for r in records {
        let _ = writeln!(
            out,
            "{:<8} {:>12} {}{}",
            r.kind.as_str(),
            r.size,
            r.path,
            if r.header == warmup_common::HeaderStatus::Failed {
                "  (header unreadable)"
            } else {
                ""
            }
        );
    }
    out.truncate(out.trim_end().len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use warmup_common::HeaderStatus;

    fn record(path: &str, kind: AssetKind) -> AssetRecord {
        AssetRecord {
            path: path.into(),
            size: 10,
            modified_ns: 0,
            kind,
            header: HeaderStatus::NotApplicable,
            fingerprint: None,
            startup_critical: false,
        }
    }

    #[test]
    fn filter_keeps_one_kind() {
        let records = vec![
            record("Content/A.uasset", AssetKind::Package),
            record("Content/t.png", AssetKind::Texture),
            record("Content/u.png", AssetKind::Texture),
        ];
        let textures = select(&records, Some(AssetKind::Texture));
        assert_eq!(textures.len(), 2);
        assert!(textures.iter().all(|r| r.kind == AssetKind::Texture));
        assert_eq!(select(&records, None).len(), 3);
        assert!(select(&records, Some(AssetKind::Audio)).is_empty());
    }

    #[test]
    fn table_marks_unreadable_headers() {
        let records = vec![
            AssetRecord {
                path: "Content/A.uasset".into(),
                size: 1234,
                modified_ns: 0,
                kind: AssetKind::Package,
                header: HeaderStatus::Parsed,
                fingerprint: None,
                startup_critical: false,
            },
            AssetRecord {
                path: "Content/B.uasset".into(),
                size: 10,
                modified_ns: 0,
                kind: AssetKind::Package,
                header: HeaderStatus::Failed,
                fingerprint: None,
                startup_critical: false,
            },
        ];
        let table = asset_table(&select(&records, None));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("package"));
        assert!(lines[0].ends_with("Content/A.uasset"));
        assert!(lines[1].ends_with("(header unreadable)"));
    }
}
