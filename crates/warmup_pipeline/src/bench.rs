//! Repeated timing of the scan and fingerprint stages.

use std::path::Path;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;
use warmup_common::FingerprintMode;
use warmup_diagnostics::DiagnosticSink;
use warmup_scan::RawAssetEntry;

use crate::error::PipelineError;
use crate::orchestrator::Pipeline;

/// Summary of one stage's iteration timings, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Timing {
    /// Mean duration.
    pub mean_ms: f64,
    /// Fastest iteration.
    pub min_ms: f64,
    /// Slowest iteration.
    pub max_ms: f64,
}

impl Timing {
    /// Summarizes a set of samples. Empty input yields zeros.
    pub fn from_samples(samples: &[Duration]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let ms: Vec<f64> = samples.iter().map(|d| d.as_secs_f64() * 1000.0).collect();
        Self {
            mean_ms: ms.iter().sum::<f64>() / ms.len() as f64,
            min_ms: ms.iter().copied().fold(f64::INFINITY, f64::min),
            max_ms: ms.iter().copied().fold(0.0, f64::max),
        }
    }

    /// Bytes per second at the mean duration, in MiB/s.
    pub fn throughput_mib_s(&self, bytes: u64) -> f64 {
        if self.mean_ms <= 0.0 {
            return 0.0;
        }
        (bytes as f64 / (1024.0 * 1024.0)) / (self.mean_ms / 1000.0)
    }
}

/// Timings for `benchmark`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    /// Iterations run.
    pub iterations: usize,
    /// Assets scanned per iteration.
    pub assets: usize,
    /// Bytes fingerprinted per iteration.
    pub total_bytes: u64,
    /// Scan stage.
    pub scan: Timing,
    /// Exhaustive fingerprinting of every asset.
    pub exhaustive: Timing,
    /// Sampled fingerprinting of every asset.
    pub sampled: Timing,
}

impl Pipeline {
    /// Runs the scan and both fingerprint modes `iterations` times (at least once).
    pub fn benchmark(&self, root: &Path, iterations: usize) -> Result<BenchmarkReport, PipelineError> {
        if !root.exists() {
            return Err(PipelineError::RootNotFound {
                path: root.to_path_buf(),
            });
        }
        let iterations = iterations.max(1);
        let fingerprinter = self.fingerprinter();
        let mut scan = Vec::with_capacity(iterations);
        let mut exhaustive = Vec::with_capacity(iterations);
        let mut sampled = Vec::with_capacity(iterations);
        let mut assets = 0;
        let mut total_bytes = 0u64;

        for i in 0..iterations {
            let started = Instant::now();
            let entries = self.scan(root, &DiagnosticSink::new())?;
            scan.push(started.elapsed());
            assets = entries.len();
            total_bytes = entries.iter().map(|e| e.size).sum();

            for (mode, samples) in [
                (FingerprintMode::Exhaustive, &mut exhaustive),
                (FingerprintMode::Sampled, &mut sampled),
            ] {
                let started = Instant::now();
                self.install(|| fingerprint_all(&fingerprinter, &entries, mode));
                samples.push(started.elapsed());
            }
            info!(iteration = i + 1, of = iterations, "benchmark iteration done");
        }

        Ok(BenchmarkReport {
            iterations,
            assets,
            total_bytes,
            scan: Timing::from_samples(&scan),
            exhaustive: Timing::from_samples(&exhaustive),
            sampled: Timing::from_samples(&sampled),
        })
    }
}

fn fingerprint_all(
    fingerprinter: &warmup_fingerprint::Fingerprinter,
    entries: &[RawAssetEntry],
    mode: FingerprintMode,
) -> usize {
    entries
        .par_iter()
        .filter(|e| fingerprinter.fingerprint_file(&e.abs_path, mode).is_ok())
        .count()
}
