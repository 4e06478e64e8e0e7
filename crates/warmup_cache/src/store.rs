//! Reading and atomically writing cache files.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::CacheError;
use crate::format::{deserialize, has_magic, serialize, StartupCache};

/// Encodes `cache` and writes it to `path`, returning the encoded size.
///
/// The bytes go to a temporary file in the destination directory, which is
/// synced and then renamed over `path`. A failure at any point leaves the
/// previous file (or no file) in place.
pub fn write_cache(path: &Path, cache: &StartupCache) -> Result<u64, CacheError> {
    let bytes = serialize(cache)?;
    write_atomic(path, &bytes)?;
    debug!(path = %path.display(), bytes = bytes.len(), "cache written");
    Ok(bytes.len() as u64)
}

/// Reads and validates the cache at `path`.
pub fn read_cache(path: &Path) -> Result<StartupCache, CacheError> {
    let bytes = std::fs::read(path).map_err(|e| CacheError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    deserialize(&bytes)
}

/// Shallow consumer check: `true` if `path` is readable and starts with the
/// cache magic token. The body is not inspected.
pub fn is_cache_usable(path: &Path) -> bool {
    let Ok(mut file) = File::open(path) else {
        return false;
    };
    let mut magic = [0u8; 8];
    file.read_exact(&mut magic).is_ok() && has_magic(&magic)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
    let io_err = |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::tests::sample_cache;

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Saved/warmup/startup.uefast");
        let cache = sample_cache();
        let size = write_cache(&path, &cache).unwrap();
        assert_eq!(size, std::fs::metadata(&path).unwrap().len());
        assert_eq!(read_cache(&path).unwrap(), cache);
        assert!(is_cache_usable(&path));
    }

    #[test]
    fn overwrite_replaces_previous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("startup.uefast");
        let mut cache = sample_cache();
        write_cache(&path, &cache).unwrap();
        cache.project = "Renamed".into();
        write_cache(&path, &cache).unwrap();
        assert_eq!(read_cache(&path).unwrap().project, "Renamed");
        // Only the destination remains; no stray temporaries.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn bad_magic_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("startup.uefast");
        let garbage = b"NOTACACHE and some more bytes".to_vec();
        std::fs::write(&path, &garbage).unwrap();

        assert!(matches!(read_cache(&path), Err(CacheError::BadMagic)));
        assert!(!is_cache_usable(&path));
        assert_eq!(std::fs::read(&path).unwrap(), garbage);
    }

    #[test]
    fn usable_check_is_shallow() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("startup.uefast");
        std::fs::write(&path, b"UEFAST01 but the rest is junk").unwrap();
        assert!(is_cache_usable(&path));
        assert!(read_cache(&path).is_err());
    }

    #[test]
    fn missing_or_short_file_is_unusable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_cache_usable(&dir.path().join("absent")));
        let short = dir.path().join("short");
        std::fs::write(&short, b"UEF").unwrap();
        assert!(!is_cache_usable(&short));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_cache(&dir.path().join("absent")),
            Err(CacheError::Io { .. })
        ));
    }
}
