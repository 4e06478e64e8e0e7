//! Error types for whole-pipeline failures.

use std::path::PathBuf;

use warmup_cache::CacheError;
use warmup_scan::ScanError;

/// Errors that abort a pipeline run.
///
/// Only whole-run preconditions live here. Problems with individual assets
/// are reported as diagnostics and never abort.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The project root does not exist.
    #[error("project root not found: {path}")]
    RootNotFound {
        /// The requested root.
        path: PathBuf,
    },

    /// No asset could be scanned.
    #[error("no assets found under {root} ({failures} files failed)")]
    EmptyTree {
        /// The scanned root.
        root: PathBuf,
        /// Number of files that were excluded by failures.
        failures: usize,
    },

    /// The worker pool could not be created.
    #[error("failed to start worker pool: {reason}")]
    ThreadPool {
        /// Description of the failure.
        reason: String,
    },

    /// The scan could not start.
    #[error(transparent)]
    Scan(ScanError),

    /// Reading or writing a cache file failed.
    #[error("cache {path}: {source}")]
    Cache {
        /// The cache file.
        path: PathBuf,
        /// The underlying cache error.
        source: CacheError,
    },
}

impl From<ScanError> for PipelineError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::RootNotFound { path } => PipelineError::RootNotFound { path },
            other => PipelineError::Scan(other),
        }
    }
}
