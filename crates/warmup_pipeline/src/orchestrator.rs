//! Stage sequencing: scan, fingerprint, graph, serialize.

use std::path::Path;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info};
use warmup_cache::StartupCache;
use warmup_common::{AssetRecord, FingerprintMode};
use warmup_config::{KernelChoice, WarmupConfig};
use warmup_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use warmup_fingerprint::{Fingerprinter, Kernel};
use warmup_graph::{DependencyEdge, DependencyGraph, LoadOrder, ReferenceResolver};
use warmup_scan::{RawAssetEntry, ScanOptions, Scanner};

use crate::error::PipelineError;
use crate::report::AnalysisReport;

/// Which stages a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Scan only.
    Scan,
    /// Scan, graph, and report. No fingerprints.
    Analyze,
    /// Scan, exhaustive fingerprints, graph, and cache.
    Cache,
    /// Scan, sampled fingerprints, graph, and cache.
    Turbo,
}

impl RunMode {
    /// The fingerprint fidelity this mode computes, if any.
    pub fn fingerprint_mode(self) -> Option<FingerprintMode> {
        match self {
            RunMode::Cache => Some(FingerprintMode::Exhaustive),
            RunMode::Turbo => Some(FingerprintMode::Sampled),
            RunMode::Scan | RunMode::Analyze => None,
        }
    }

    /// Whether this mode builds the dependency graph.
    pub fn builds_graph(self) -> bool {
        self != RunMode::Scan
    }

    /// Lowercase name used in reports and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            RunMode::Scan => "scan",
            RunMode::Analyze => "analyze",
            RunMode::Cache => "cache",
            RunMode::Turbo => "turbo",
        }
    }
}

/// Everything a run produced.
#[derive(Debug)]
pub struct RunOutcome {
    /// The mode that ran.
    pub mode: RunMode,
    /// Final asset records in path order.
    pub records: Vec<AssetRecord>,
    /// The dependency graph after cycle breaking. Absent for [`RunMode::Scan`].
    pub graph: Option<DependencyGraph>,
    /// The derived load order. Absent for [`RunMode::Scan`].
    pub load_order: Option<LoadOrder>,
    /// All diagnostics, sorted.
    pub diagnostics: Vec<Diagnostic>,
    /// The run summary.
    pub report: AnalysisReport,
    /// The cache to persist, for [`RunMode::Cache`] and [`RunMode::Turbo`].
    pub cache: Option<StartupCache>,
    /// Wall time per stage, in execution order.
    pub timings: Vec<(&'static str, Duration)>,
}

/// The pipeline: configuration plus a fixed-size worker pool.
pub struct Pipeline {
    config: WarmupConfig,
    pool: ThreadPool,
}

impl Pipeline {
    /// Creates a pipeline with `config.worker_threads()` workers.
    pub fn new(config: WarmupConfig) -> Result<Self, PipelineError> {
        let threads = config.worker_threads();
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("warmup-worker-{i}"))
            .build()
            .map_err(|e| PipelineError::ThreadPool {
                reason: e.to_string(),
            })?;
        debug!(threads, "worker pool started");
        Ok(Self { config, pool })
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &WarmupConfig {
        &self.config
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// A fingerprinter configured from `[fingerprint]` and `[scan]`.
    pub fn fingerprinter(&self) -> Fingerprinter {
        let kernel = match self.config.fingerprint.kernel {
            KernelChoice::Scalar => Kernel::Scalar,
            KernelChoice::Wide => Kernel::Wide,
        };
        Fingerprinter::new(
            kernel,
            self.config.fingerprint.sample_window,
            self.config.scan.mmap_threshold,
        )
    }

    /// A scanner configured from `[scan]` and `[startup]`.
    pub fn scanner(&self) -> Scanner {
        Scanner::new(ScanOptions::from_config(&self.config))
    }

    /// The project identifier: `project.name`, else the root's directory name.
    pub fn project_name(&self, root: &Path) -> String {
        if let Some(name) = &self.config.project.name {
            return name.clone();
        }
        root.canonicalize()
            .ok()
            .as_deref()
            .unwrap_or(root)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string())
    }

    /// Runs `f` on the worker pool.
    pub fn install<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        self.pool.install(f)
    }

    /// Scans `root`, emitting per-file failures and parse failures into `sink`.
    ///
    /// Fails with [`PipelineError::EmptyTree`] if no file could be scanned.
    pub fn scan(
        &self,
        root: &Path,
        sink: &DiagnosticSink,
    ) -> Result<Vec<RawAssetEntry>, PipelineError> {
        let scanner = self.scanner();
        let output = self.install(|| scanner.scan(root))?;

        sink.extend(output.failures.iter().map(|f| f.to_diagnostic()));
        sink.extend(output.entries.iter().filter_map(RawAssetEntry::parse_diagnostic));

        if output.entries.is_empty() {
            return Err(PipelineError::EmptyTree {
                root: root.to_path_buf(),
                failures: output.failures.len(),
            });
        }
        Ok(output.entries)
    }

    /// Executes the stages for `mode` over the tree at `root`.
    pub fn run(&self, root: &Path, mode: RunMode) -> Result<RunOutcome, PipelineError> {
        if !root.exists() {
            return Err(PipelineError::RootNotFound {
                path: root.to_path_buf(),
            });
        }
        let project = self.project_name(root);
        info!(project = %project, mode = mode.as_str(), threads = self.threads(), "run started");

        let sink = DiagnosticSink::new();
        let mut timings = Vec::new();

        let started = Instant::now();
        let mut entries = self.scan(root, &sink)?;
        timings.push(("scan", started.elapsed()));

        let mut records: Vec<AssetRecord> = entries.iter().map(RawAssetEntry::to_record).collect();

        if let Some(fp_mode) = mode.fingerprint_mode() {
            let started = Instant::now();
            let (kept_entries, kept_records) = self.fingerprint_stage(entries, records, fp_mode, &sink);
            entries = kept_entries;
            records = kept_records;
            timings.push(("fingerprint", started.elapsed()));
            if records.is_empty() {
                return Err(PipelineError::EmptyTree {
                    root: root.to_path_buf(),
                    failures: sink.error_count(),
                });
            }
        }

        let (graph, load_order, edge_count) = if mode.builds_graph() {
            let started = Instant::now();
            let (graph, order, edges) = build_graph(&entries, records, &sink);
            records = graph.records().cloned().collect();
            timings.push(("graph", started.elapsed()));
            (Some(graph), Some(order), edges)
        } else {
            (None, None, 0)
        };

        let diagnostics = sink.take_sorted();
        let report = AnalysisReport::build(&project, mode.as_str(), &records, &diagnostics, edge_count);

        let cache = match (mode.fingerprint_mode(), &load_order) {
            (Some(fp_mode), Some(order)) => Some(StartupCache::new(
                project.clone(),
                fp_mode,
                records.clone(),
                order.as_slice().to_vec(),
            )),
            _ => None,
        };

        info!(
            assets = report.total_assets,
            critical = report.startup_critical_count,
            diagnostics = diagnostics.len(),
            "run finished"
        );
        Ok(RunOutcome {
            mode,
            records,
            graph,
            load_order,
            diagnostics,
            report,
            cache,
            timings,
        })
    }

    /// Runs `mode` and, if it produced a cache, writes it atomically to `output`.
    ///
    /// Nothing is written when the run fails.
    pub fn run_and_persist(
        &self,
        root: &Path,
        mode: RunMode,
        output: &Path,
    ) -> Result<(RunOutcome, u64), PipelineError> {
        let outcome = self.run(root, mode)?;
        let written = match &outcome.cache {
            Some(cache) => {
                warmup_cache::write_cache(output, cache).map_err(|source| PipelineError::Cache {
                    path: output.to_path_buf(),
                    source,
                })?
            }
            None => 0,
        };
        if written > 0 {
            info!(path = %output.display(), bytes = written, "cache written");
        }
        Ok((outcome, written))
    }

    // Fingerprints every entry in parallel. Entries whose content cannot be
    // read are dropped from both lists with an E103 diagnostic.
    fn fingerprint_stage(
        &self,
        entries: Vec<RawAssetEntry>,
        records: Vec<AssetRecord>,
        mode: FingerprintMode,
        sink: &DiagnosticSink,
    ) -> (Vec<RawAssetEntry>, Vec<AssetRecord>) {
        let fingerprinter = self.fingerprinter();
        let results: Vec<_> = self.install(|| {
            entries
                .par_iter()
                .map(|e| fingerprinter.fingerprint_file(&e.abs_path, mode))
                .collect()
        });

        let mut kept_entries = Vec::with_capacity(entries.len());
        let mut kept_records = Vec::with_capacity(records.len());
        for ((entry, mut record), result) in entries.into_iter().zip(records).zip(results) {
            match result {
                Ok(fp) => {
                    record.fingerprint = Some(fp);
                    kept_entries.push(entry);
                    kept_records.push(record);
                }
                Err(err) => {
                    debug!(path = %entry.path, error = %err, "fingerprint failed");
                    sink.emit(
                        Diagnostic::new(DiagnosticCode::FINGERPRINT_FAILED, "could not fingerprint asset")
                            .with_path(entry.path.clone())
                            .with_note(err.to_string()),
                    );
                }
            }
        }
        (kept_entries, kept_records)
    }
}

// Resolves references, builds the graph, flags startup-critical assets, and
// orders it. Reachability runs before cycle breaking so that removed edges
// do not hide dependencies of entry assets.
fn build_graph(
    entries: &[RawAssetEntry],
    records: Vec<AssetRecord>,
    sink: &DiagnosticSink,
) -> (DependencyGraph, LoadOrder, usize) {
    let resolver = ReferenceResolver::new(&records);
    let edges: Vec<DependencyEdge> = entries
        .iter()
        .flat_map(|e| resolver.edges_for(&e.path, &e.references))
        .collect();

    let (mut graph, dangling) = DependencyGraph::build(records, edges);
    sink.extend(dangling);
    let edge_count = graph.edge_count();

    let critical = graph.mark_startup_critical(
        entries.iter().filter(|e| e.is_entry).map(|e| e.path.as_str()),
    );
    let (order, cycles) = graph.topo_order();
    sink.extend(cycles);

    info!(
        nodes = graph.node_count(),
        edges = edge_count,
        critical,
        "dependency graph ready"
    );
    (graph, order, edge_count)
}
