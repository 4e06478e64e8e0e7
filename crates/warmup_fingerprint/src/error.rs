//! Error types for fingerprinting.

use std::path::PathBuf;

/// Errors raised while reading an asset for fingerprinting.
///
/// A partial read is never accepted: if fewer bytes are available than the
/// file's metadata reports, the fingerprint fails rather than hashing a prefix.
#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    /// The file could not be opened, stat'ed, mapped, or read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The asset path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file yielded a different number of bytes than its metadata reported.
    #[error("short read of {path}: expected {expected} bytes, got {actual}")]
    Truncated {
        /// The asset path.
        path: PathBuf,
        /// Size reported by the filesystem.
        expected: u64,
        /// Bytes actually obtained.
        actual: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error_display() {
        let err = FingerprintError::Read {
            path: PathBuf::from("Content/Hero.uasset"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let msg = err.to_string();
        assert!(msg.contains("failed to read"));
        assert!(msg.contains("Hero.uasset"));
    }

    #[test]
    fn truncated_display() {
        let err = FingerprintError::Truncated {
            path: PathBuf::from("a.uasset"),
            expected: 100,
            actual: 40,
        };
        assert!(err.to_string().contains("expected 100 bytes, got 40"));
    }
}
