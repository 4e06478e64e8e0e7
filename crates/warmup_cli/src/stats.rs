//! `warmup stats`: summarize a cache file.

use std::fmt::Write as _;
use std::fs;

use warmup_cache::{read_cache, CacheStats};

use crate::pipeline::{emit_output, human_bytes};
use crate::{GlobalArgs, ReportFormat, StatsArgs};

/// Number of duplicate groups listed in text output.
const SHOWN_DUPLICATES: usize = 10;

/// Runs the `warmup stats` command.
pub fn run(args: &StatsArgs, _global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let cache = read_cache(&args.cache).map_err(|e| format!("{}: {e}", args.cache.display()))?;
    let encoded_size = fs::metadata(&args.cache)?.len();
    let stats = CacheStats::compute(&cache, encoded_size);

    let content = match args.format {
        ReportFormat::Text => render(&stats).trim_end().to_string(),
        ReportFormat::Json => serde_json::to_string_pretty(&stats)?,
    };
    emit_output(args.output.as_deref(), &content)?;
    Ok(0)
}

fn render(stats: &CacheStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "project:          {}", stats.project);
    let _ = writeln!(out, "format version:   {}", stats.version);
    let _ = writeln!(out, "created at:       {} (unix seconds)", stats.created_at);
    let _ = writeln!(out, "fingerprint mode: {}", stats.fingerprint_mode);
    let _ = writeln!(out, "encoded size:     {}", human_bytes(stats.encoded_size));
    let _ = writeln!(
        out,
        "assets:           {} ({})",
        stats.asset_count,
        human_bytes(stats.total_bytes)
    );
    let _ = writeln!(
        out,
        "startup-critical: {} ({})",
        stats.critical_count,
        human_bytes(stats.critical_bytes)
    );
    for (kind, totals) in &stats.by_kind {
        let _ = writeln!(
            out,
            "  {:<8} {:>6} {:>12}",
            kind.as_str(),
            totals.count,
            human_bytes(totals.bytes)
        );
    }
    if stats.extension_count > 0 {
        let _ = writeln!(out, "extensions:       {}", stats.extension_count);
    }
    let _ = writeln!(
        out,
        "duplicates:       {} group(s), {} recoverable",
        stats.duplicates.len(),
        human_bytes(stats.wasted_bytes())
    );
    for group in stats.duplicates.iter().take(SHOWN_DUPLICATES) {
        let _ = writeln!(
            out,
            "  {} x{} {}: {}",
            group.fingerprint,
            group.paths.len(),
            human_bytes(group.size),
            group.paths.join(", ")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use warmup_cache::StartupCache;
    use warmup_common::{AssetKind, AssetRecord, Fingerprint, FingerprintMode, HeaderStatus};

    fn asset(path: &str, fp: u64) -> AssetRecord {
        AssetRecord {
            path: path.into(),
            size: 2048,
            modified_ns: 0,
            kind: AssetKind::Texture,
            header: HeaderStatus::NotApplicable,
            fingerprint: Some(Fingerprint(fp)),
            startup_critical: false,
        }
    }

    #[test]
    fn render_includes_duplicates() {
        let cache = StartupCache::new(
            "Demo",
            FingerprintMode::Exhaustive,
            vec![asset("Content/a.png", 7), asset("Content/b.png", 7)],
            vec!["Content/a.png".into(), "Content/b.png".into()],
        );
        let text = render(&CacheStats::compute(&cache, 300));
        assert!(text.contains("project:          Demo"));
        assert!(text.contains("fingerprint mode: exhaustive"));
        assert!(text.contains("duplicates:       1 group(s), 2.0 KiB recoverable"));
        assert!(text.contains("Content/a.png, Content/b.png"));
    }
}
