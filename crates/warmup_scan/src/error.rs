//! Error types for the asset scanner.

use std::path::PathBuf;

/// Errors that abort a scan.
///
/// Per-file problems never surface here; they become [`ScanFailure`](crate::ScanFailure)s.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The scan root does not exist.
    #[error("scan root not found: {path}")]
    RootNotFound {
        /// The requested root.
        path: PathBuf,
    },

    /// The scan root exists but is not a directory.
    #[error("scan root is not a directory: {path}")]
    NotADirectory {
        /// The requested root.
        path: PathBuf,
    },
}
