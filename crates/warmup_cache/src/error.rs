//! Error types for cache encoding, decoding, and storage.

use std::path::PathBuf;

/// Errors that can occur while reading or writing a startup cache.
///
/// Decode errors are never treated as "no cache": a file that exists but
/// fails validation is reported to the caller as-is.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The input is shorter than the magic token or does not start with it.
    #[error("not a startup cache (bad magic)")]
    BadMagic,

    /// The cache was written by a newer, incompatible format revision.
    #[error("unsupported cache version {found} (this build reads up to {supported})")]
    UnsupportedVersion {
        /// Version recorded in the file.
        found: String,
        /// Newest version this build understands.
        supported: String,
    },

    /// The body failed its checksum or could not be decoded.
    #[error("corrupt cache body: {reason}")]
    CorruptBody {
        /// Description of the problem.
        reason: String,
    },

    /// An I/O error occurred while reading or writing the cache file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The cache could not be encoded.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = CacheError::Io {
            path: PathBuf::from("/tmp/project/Saved/startup.uefast"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cache I/O error"));
        assert!(msg.contains("startup.uefast"));
    }

    #[test]
    fn unsupported_version_display() {
        let err = CacheError::UnsupportedVersion {
            found: "2.0".to_string(),
            supported: "1.0".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("2.0"));
        assert!(msg.contains("1.0"));
    }

    #[test]
    fn corrupt_body_display() {
        let err = CacheError::CorruptBody {
            reason: "checksum mismatch".to_string(),
        };
        assert!(err.to_string().contains("checksum mismatch"));
    }
}
