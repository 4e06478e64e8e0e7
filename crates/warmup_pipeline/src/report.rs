//! The JSON analysis report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use warmup_cache::{find_duplicates, DuplicateGroup};
use warmup_common::{AssetKind, AssetRecord};
use warmup_diagnostics::{Diagnostic, DiagnosticCode, Severity};

/// Seconds saved per asset kept off the startup path.
const DEFERRED_LOAD_SECONDS: f64 = 0.01;
/// Seconds saved per duplicate group collapsed to one copy.
const DUPLICATE_SECONDS: f64 = 0.05;
/// Share of critical assets above which lazy loading is recommended.
const STARTUP_RATIO_LIMIT: f64 = 0.3;
/// Texture count above which streaming is recommended.
const TEXTURE_LIMIT: usize = 1000;

/// One entry in the report's failure list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEntry {
    /// Diagnostic code, e.g. `E101`.
    pub code: String,
    /// Severity of the problem.
    pub severity: Severity,
    /// Asset path concerned, if any.
    pub path: Option<String>,
    /// Description.
    pub message: String,
}

impl From<&Diagnostic> for FailureEntry {
    fn from(d: &Diagnostic) -> Self {
        Self {
            code: d.code.to_string(),
            severity: d.severity,
            path: d.path.clone(),
            message: match d.notes.first() {
                Some(note) => format!("{}: {note}", d.message),
                None => d.message.clone(),
            },
        }
    }
}

/// Count and byte total for one asset kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindSummary {
    /// Number of assets.
    pub count: usize,
    /// Sum of sizes in bytes.
    pub bytes: u64,
}

/// How urgent a [`Recommendation`] is. Sorts most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Dominates startup time.
    High,
    /// Worth scheduling.
    Medium,
    /// Hygiene.
    Low,
}

/// One suggested change to the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Urgency.
    pub priority: Priority,
    /// Area concerned, e.g. `startup`.
    pub category: String,
    /// What to do.
    pub message: String,
    /// Rough startup time the change would save.
    pub estimated_impact_seconds: f64,
}

/// Per-run summary written by `analyze`. Not persisted in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Project identifier.
    pub project: String,
    /// Pipeline mode that produced the report.
    pub mode: String,
    /// Assets that made it through the run.
    pub total_assets: usize,
    /// Assets reachable from an entry.
    pub startup_critical_count: usize,
    /// Every diagnostic raised during the run, sorted by path then code.
    pub failures: Vec<FailureEntry>,
    /// Files excluded from the asset set by read or fingerprint errors.
    pub excluded_count: usize,
    /// Sum of asset sizes.
    pub total_bytes: u64,
    /// Sum of startup-critical asset sizes.
    pub startup_critical_bytes: u64,
    /// Totals by asset kind.
    pub by_kind: BTreeMap<String, KindSummary>,
    /// Dependency edges kept after resolving references.
    pub edge_count: usize,
    /// References that named no scanned asset.
    pub dangling_count: usize,
    /// Edges removed to break cycles.
    pub cycle_count: usize,
    /// Groups of assets with identical content. `None` when the run
    /// computed no fingerprints.
    pub duplicates: Option<Vec<DuplicateGroup>>,
    /// Rough startup time recoverable by deferring non-critical assets and
    /// collapsing duplicates.
    pub estimated_savings_seconds: f64,
    /// Suggested changes, most urgent first.
    pub recommendations: Vec<Recommendation>,
}

impl AnalysisReport {
    /// Summarizes a finished run.
    pub fn build(
        project: &str,
        mode: &str,
        records: &[AssetRecord],
        diagnostics: &[Diagnostic],
        edge_count: usize,
    ) -> Self {
        let count = |code: DiagnosticCode| diagnostics.iter().filter(|d| d.code == code).count();

        let mut by_kind: BTreeMap<String, KindSummary> = BTreeMap::new();
        for kind in AssetKind::ALL {
            let mut summary = KindSummary::default();
            for r in records.iter().filter(|r| r.kind == kind) {
                summary.count += 1;
                summary.bytes += r.size;
            }
            if summary.count > 0 {
                by_kind.insert(kind.as_str().to_string(), summary);
            }
        }

        let fingerprinted = records.iter().any(|r| r.fingerprint.is_some());
        let duplicates = fingerprinted.then(|| find_duplicates(records));
        let critical = records.iter().filter(|r| r.startup_critical).count();
        let duplicate_groups = duplicates.as_ref().map_or(0, Vec::len);

        let mut report = Self {
            project: project.to_string(),
            mode: mode.to_string(),
            total_assets: records.len(),
            startup_critical_count: critical,
            failures: diagnostics.iter().map(FailureEntry::from).collect(),
            excluded_count: diagnostics.iter().filter(|d| d.severity.is_error()).count(),
            total_bytes: records.iter().map(|r| r.size).sum(),
            startup_critical_bytes: records
                .iter()
                .filter(|r| r.startup_critical)
                .map(|r| r.size)
                .sum(),
            by_kind,
            edge_count,
            dangling_count: count(DiagnosticCode::DANGLING_REFERENCE),
            cycle_count: count(DiagnosticCode::CYCLE_BROKEN),
            duplicates,
            estimated_savings_seconds: (records.len() - critical) as f64 * DEFERRED_LOAD_SECONDS
                + duplicate_groups as f64 * DUPLICATE_SECONDS,
            recommendations: Vec::new(),
        };
        report.recommendations = report.recommend();
        report
    }

    /// Bytes held by redundant copies of duplicated assets.
    pub fn duplicate_wasted_bytes(&self) -> u64 {
        self.duplicates
            .iter()
            .flatten()
            .map(DuplicateGroup::wasted_bytes)
            .sum()
    }

    fn recommend(&self) -> Vec<Recommendation> {
        let mut out = Vec::new();
        let mut push = |priority, category: &str, message: String, impact: f64| {
            out.push(Recommendation {
                priority,
                category: category.to_string(),
                message,
                estimated_impact_seconds: impact,
            })
        };

        if self.total_assets > 0 {
            let ratio = self.startup_critical_count as f64 / self.total_assets as f64;
            if ratio > STARTUP_RATIO_LIMIT {
                push(
                    Priority::High,
                    "startup",
                    format!(
                        "{}% of assets are reachable from an entry; load the rest lazily",
                        (ratio * 100.0).round() as u32
                    ),
                    ratio * 10.0,
                );
            }
        }
        if let Some(textures) = self.by_kind.get(AssetKind::Texture.as_str()) {
            if textures.count > TEXTURE_LIMIT {
                push(
                    Priority::Medium,
                    "textures",
                    format!("{} textures found; enable texture streaming", textures.count),
                    5.0,
                );
            }
        }
        if let Some(groups) = self.duplicates.as_ref().filter(|g| !g.is_empty()) {
            push(
                Priority::Medium,
                "duplicates",
                format!(
                    "{} group(s) of identical assets hold {} redundant bytes",
                    groups.len(),
                    self.duplicate_wasted_bytes()
                ),
                groups.len() as f64 * DUPLICATE_SECONDS,
            );
        }
        if self.cycle_count > 0 {
            push(
                Priority::Low,
                "dependencies",
                format!(
                    "{} dependency cycle(s) were broken; their load order is arbitrary",
                    self.cycle_count
                ),
                0.0,
            );
        }
        if self.dangling_count > 0 {
            push(
                Priority::Low,
                "references",
                format!("{} reference(s) name no scanned asset", self.dangling_count),
                0.0,
            );
        }

        out.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.category.cmp(&b.category)));
        out
    }

    /// Renders the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warmup_common::{Fingerprint, HeaderStatus};

    fn record(path: &str, kind: AssetKind, size: u64, critical: bool) -> AssetRecord {
        AssetRecord {
            path: path.into(),
            size,
            modified_ns: 0,
            kind,
            header: HeaderStatus::NotApplicable,
            fingerprint: None,
            startup_critical: critical,
        }
    }

    #[test]
    fn summarizes_records_and_diagnostics() {
        let records = vec![
            record("Content/A.uasset", AssetKind::Package, 100, true),
            record("Content/M.umap", AssetKind::Map, 300, true),
            record("Content/t.png", AssetKind::Texture, 50, false),
        ];
        let diags = vec![
            Diagnostic::new(DiagnosticCode::READ_ERROR, "could not read file")
                .with_path("Content/bad.uasset")
                .with_note("permission denied"),
            Diagnostic::new(DiagnosticCode::CYCLE_BROKEN, "cycle").with_path("Content/A.uasset"),
            Diagnostic::new(DiagnosticCode::DANGLING_REFERENCE, "missing")
                .with_path("Content/M.umap"),
        ];
        let report = AnalysisReport::build("Demo", "analyze", &records, &diags, 4);

        assert_eq!(report.total_assets, 3);
        assert_eq!(report.startup_critical_count, 2);
        assert_eq!(report.startup_critical_bytes, 400);
        assert_eq!(report.total_bytes, 450);
        assert_eq!(report.failures.len(), 3);
        assert_eq!(report.failures[0].code, "E101");
        assert_eq!(report.failures[0].message, "could not read file: permission denied");
        assert_eq!(report.excluded_count, 1);
        assert_eq!(report.dangling_count, 1);
        assert_eq!(report.cycle_count, 1);
        assert_eq!(report.edge_count, 4);
        assert_eq!(report.by_kind["map"].bytes, 300);
        assert!(!report.by_kind.contains_key("audio"));
    }

    fn fingerprinted(path: &str, size: u64, fp: u64, critical: bool) -> AssetRecord {
        let mut r = record(path, AssetKind::Package, size, critical);
        r.fingerprint = Some(Fingerprint(fp));
        r
    }

    #[test]
    fn duplicates_only_with_fingerprints() {
        let plain = vec![
            record("Content/A.uasset", AssetKind::Package, 100, false),
            record("Content/B.uasset", AssetKind::Package, 100, false),
        ];
        let report = AnalysisReport::build("Demo", "analyze", &plain, &[], 0);
        assert!(report.duplicates.is_none());
        assert!(report.recommendations.iter().all(|r| r.category != "duplicates"));

        let hashed = vec![
            fingerprinted("Content/A.uasset", 100, 9, false),
            fingerprinted("Content/B.uasset", 100, 9, false),
            fingerprinted("Content/C.uasset", 100, 8, false),
        ];
        let report = AnalysisReport::build("Demo", "cache", &hashed, &[], 0);
        let groups = report.duplicates.as_ref().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].paths, vec!["Content/A.uasset", "Content/B.uasset"]);
        assert_eq!(report.duplicate_wasted_bytes(), 100);
        let dup = report
            .recommendations
            .iter()
            .find(|r| r.category == "duplicates")
            .unwrap();
        assert_eq!(dup.priority, Priority::Medium);
    }

    #[test]
    fn savings_count_deferred_assets_and_duplicates() {
        let records = vec![
            fingerprinted("Content/A.uasset", 10, 1, true),
            fingerprinted("Content/B.uasset", 10, 1, false),
            fingerprinted("Content/C.uasset", 10, 2, false),
        ];
        let report = AnalysisReport::build("Demo", "cache", &records, &[], 0);
        // Two deferred assets and one duplicate group.
        assert!((report.estimated_savings_seconds - (2.0 * 0.01 + 0.05)).abs() < 1e-9);
    }

    #[test]
    fn recommendations_sorted_by_priority() {
        let records = vec![
            record("Content/A.uasset", AssetKind::Package, 10, true),
            record("Content/B.uasset", AssetKind::Package, 10, false),
        ];
        let diags = vec![
            Diagnostic::new(DiagnosticCode::CYCLE_BROKEN, "cycle").with_path("Content/A.uasset"),
            Diagnostic::new(DiagnosticCode::DANGLING_REFERENCE, "missing")
                .with_path("Content/B.uasset"),
        ];
        let report = AnalysisReport::build("Demo", "analyze", &records, &diags, 1);
        let got: Vec<(Priority, &str)> = report
            .recommendations
            .iter()
            .map(|r| (r.priority, r.category.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                (Priority::High, "startup"),
                (Priority::Low, "dependencies"),
                (Priority::Low, "references"),
            ]
        );
        assert!(report.recommendations[0].message.starts_with("50%"));
    }

    #[test]
    fn quiet_project_has_no_recommendations() {
        let records = vec![
            record("Content/A.uasset", AssetKind::Package, 10, false),
            record("Content/B.uasset", AssetKind::Package, 10, false),
        ];
        let report = AnalysisReport::build("Demo", "analyze", &records, &[], 0);
        assert!(report.recommendations.is_empty());
        assert!((report.estimated_savings_seconds - 0.02).abs() < 1e-9);
    }

    #[test]
    fn json_has_required_fields() {
        let report = AnalysisReport::build("Demo", "analyze", &[], &[], 0);
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["total_assets"], 0);
        assert_eq!(value["startup_critical_count"], 0);
        assert!(value["failures"].as_array().unwrap().is_empty());
        assert!(value["duplicates"].is_null());
        assert_eq!(value["estimated_savings_seconds"], 0.0);
        assert!(value["recommendations"].as_array().unwrap().is_empty());
    }
}
