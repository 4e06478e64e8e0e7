//! Drift detection between a cache and the current tree.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};
use warmup_cache::StartupCache;
use warmup_common::{AssetRecord, FingerprintMode};
use warmup_scan::{FileStat, ScanFailure};

use crate::error::PipelineError;
use crate::orchestrator::Pipeline;

/// Verification strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyMode {
    /// Re-fingerprint every cached asset that still exists.
    Full,
    /// Compare size and modification time, plus a sampled fingerprint when
    /// the cache holds sampled fingerprints and `verify.quick_sample` is on.
    /// The tree is only stat'ed; no header is read.
    ///
    /// A heuristic: a content edit that keeps both size and modification
    /// time goes unnoticed.
    Quick,
}

impl VerifyMode {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            VerifyMode::Full => "full",
            VerifyMode::Quick => "quick",
        }
    }
}

/// Result of comparing a cache against the tree. Path lists are sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    /// Strategy used.
    pub mode: VerifyMode,
    /// Number of cached assets that still match.
    pub unchanged: usize,
    /// Cached assets whose content or metadata differs, or that can no longer be read.
    pub changed: Vec<String>,
    /// Cached assets absent from the tree.
    pub missing: Vec<String>,
    /// Assets on disk that the cache does not know.
    pub added: Vec<String>,
}

impl VerifyReport {
    /// Returns `true` if nothing drifted.
    pub fn is_clean(&self) -> bool {
        self.drift_count() == 0
    }

    /// Total number of changed, missing, and added assets.
    pub fn drift_count(&self) -> usize {
        self.changed.len() + self.missing.len() + self.added.len()
    }
}

enum Check<'a> {
    Compare(&'a AssetRecord, &'a FileStat),
    Unreadable(&'a AssetRecord),
    Missing(&'a AssetRecord),
}

impl Pipeline {
    /// Compares `cache` with the tree at `root`. The cache is never modified.
    pub fn verify(
        &self,
        cache: &StartupCache,
        root: &Path,
        mode: VerifyMode,
    ) -> Result<VerifyReport, PipelineError> {
        if !root.exists() {
            return Err(PipelineError::RootNotFound {
                path: root.to_path_buf(),
            });
        }
        let (observed, failures) = self.observe(root, mode)?;

        let current: BTreeMap<&str, &FileStat> =
            observed.iter().map(|e| (e.path.as_str(), e)).collect();
        let failed: BTreeSet<&str> = failures.iter().map(|f| f.path.as_str()).collect();
        let cached: BTreeSet<&str> = cache.assets.iter().map(|a| a.path.as_str()).collect();

        let checks: Vec<Check<'_>> = cache
            .assets
            .iter()
            .map(|record| match current.get(record.path.as_str()) {
                Some(&entry) => Check::Compare(record, entry),
                None if failed.contains(record.path.as_str()) => Check::Unreadable(record),
                None => Check::Missing(record),
            })
            .collect();

        let fingerprinter = self.fingerprinter();
        let quick_sample = self.config().verify.quick_sample
            && cache.fingerprint_mode == FingerprintMode::Sampled;

        let drifted: Vec<Option<bool>> = self.install(|| {
            checks
                .par_iter()
                .map(|check| match check {
                    Check::Missing(_) => None,
                    Check::Unreadable(_) => Some(true),
                    Check::Compare(record, entry) => Some(match mode {
                        VerifyMode::Full => match record.fingerprint {
                            Some(expected) => fingerprinter
                                .fingerprint_file(&entry.abs_path, cache.fingerprint_mode)
                                .map_or(true, |actual| actual != expected),
                            None => metadata_differs(record, entry),
                        },
                        VerifyMode::Quick => {
                            metadata_differs(record, entry)
                                || match (quick_sample, record.fingerprint) {
                                    (true, Some(expected)) => fingerprinter
                                        .fingerprint_file(&entry.abs_path, FingerprintMode::Sampled)
                                        .map_or(true, |actual| actual != expected),
                                    _ => false,
                                }
                        }
                    }),
                })
                .collect()
        });

        let mut report = VerifyReport {
            mode,
            unchanged: 0,
            changed: Vec::new(),
            missing: Vec::new(),
            added: current
                .keys()
                .filter(|p| !cached.contains(*p))
                .map(|p| p.to_string())
                .collect(),
        };
        for (check, drift) in checks.iter().zip(drifted) {
            let record = match check {
                Check::Compare(r, _) | Check::Unreadable(r) | Check::Missing(r) => r,
            };
            match drift {
                None => report.missing.push(record.path.clone()),
                Some(true) => {
                    debug!(path = %record.path, "asset changed");
                    report.changed.push(record.path.clone());
                }
                Some(false) => report.unchanged += 1,
            }
        }
        report.changed.sort();
        report.missing.sort();

        info!(
            mode = mode.as_str(),
            unchanged = report.unchanged,
            changed = report.changed.len(),
            missing = report.missing.len(),
            added = report.added.len(),
            "verify finished"
        );
        Ok(report)
    }

    // Full mode re-runs the scan; quick mode only stats the tree.
    fn observe(
        &self,
        root: &Path,
        mode: VerifyMode,
    ) -> Result<(Vec<FileStat>, Vec<ScanFailure>), PipelineError> {
        let scanner = self.scanner();
        Ok(match mode {
            VerifyMode::Full => {
                let output = self.install(|| scanner.scan(root))?;
                let stats = output.entries.into_iter().map(FileStat::from).collect();
                (stats, output.failures)
            }
            VerifyMode::Quick => {
                let output = self.install(|| scanner.scan_metadata(root))?;
                (output.entries, output.failures)
            }
        })
    }
}

fn metadata_differs(record: &AssetRecord, entry: &FileStat) -> bool {
    record.size != entry.size || record.modified_ns != entry.modified_ns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drift_counts() {
        let mut report = VerifyReport {
            mode: VerifyMode::Quick,
            unchanged: 3,
            changed: Vec::new(),
            missing: Vec::new(),
            added: Vec::new(),
        };
        assert!(report.is_clean());
        report.changed.push("a".into());
        report.added.push("b".into());
        assert_eq!(report.drift_count(), 2);
        assert!(!report.is_clean());
    }

    #[test]
    fn mode_serializes_lowercase() {
        let report = VerifyReport {
            mode: VerifyMode::Full,
            unchanged: 0,
            changed: vec!["x".into()],
            missing: Vec::new(),
            added: Vec::new(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "full");
        assert_eq!(json["changed"][0], "x");
    }
}
