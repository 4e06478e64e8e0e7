//! Per-file scan results.

use std::path::PathBuf;

use warmup_common::{AssetKind, AssetRecord, HeaderStatus};
use warmup_diagnostics::{Diagnostic, DiagnosticCode};

/// Metadata collected for one readable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAssetEntry {
    /// Project-relative path with `/` separators.
    pub path: String,
    /// Absolute path used for later reads.
    pub abs_path: PathBuf,
    /// Size in bytes from filesystem metadata.
    pub size: u64,
    /// Modification time in nanoseconds since the Unix epoch, or 0 if unavailable.
    pub modified_ns: u64,
    /// Kind from the magic probe.
    pub kind: AssetKind,
    /// Header parse outcome.
    pub header: HeaderStatus,
    /// Why the header parse failed, when it did.
    pub parse_error: Option<String>,
    /// Raw dependency references declared in the header.
    pub references: Vec<String>,
    /// Whether this asset seeds startup-critical reachability.
    pub is_entry: bool,
}

impl RawAssetEntry {
    /// Converts to an [`AssetRecord`] with no fingerprint and the critical flag cleared.
    pub fn to_record(&self) -> AssetRecord {
        AssetRecord {
            path: self.path.clone(),
            size: self.size,
            modified_ns: self.modified_ns,
            kind: self.kind,
            header: self.header,
            fingerprint: None,
            startup_critical: false,
        }
    }

    /// The parse-failure diagnostic for this entry, if its header failed.
    pub fn parse_diagnostic(&self) -> Option<Diagnostic> {
        let reason = self.parse_error.as_deref()?;
        Some(
            Diagnostic::new(
                DiagnosticCode::PARSE_FAILURE,
                format!("could not parse {} header", self.kind),
            )
            .with_path(self.path.clone())
            .with_note(reason.to_string()),
        )
    }
}

/// Filesystem metadata for one file, as seen by a metadata-only walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    /// Project-relative path with `/` separators.
    pub path: String,
    /// Absolute path.
    pub abs_path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Modification time in nanoseconds since the Unix epoch, or 0 if unavailable.
    pub modified_ns: u64,
}

impl From<RawAssetEntry> for FileStat {
    fn from(entry: RawAssetEntry) -> Self {
        Self {
            path: entry.path,
            abs_path: entry.abs_path,
            size: entry.size,
            modified_ns: entry.modified_ns,
        }
    }
}

/// A file excluded from the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFailure {
    /// Project-relative path, or the absolute path if it could not be relativized.
    pub path: String,
    /// [`DiagnosticCode::READ_ERROR`] or [`DiagnosticCode::PROBE_TOO_SMALL`].
    pub code: DiagnosticCode,
    /// Human-readable cause.
    pub reason: String,
}

impl ScanFailure {
    /// Builds a read failure.
    pub fn read(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self {
            path: path.into(),
            code: DiagnosticCode::READ_ERROR,
            reason: reason.to_string(),
        }
    }

    /// Builds a too-small-to-probe failure.
    pub fn too_small(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            code: DiagnosticCode::PROBE_TOO_SMALL,
            reason: format!("{size} bytes is below the 4-byte type probe"),
        }
    }

    /// Converts to a diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let message = if self.code == DiagnosticCode::PROBE_TOO_SMALL {
            "file too small to classify"
        } else {
            "could not read file"
        };
        Diagnostic::new(self.code, message)
            .with_path(self.path.clone())
            .with_note(self.reason.clone())
    }
}
