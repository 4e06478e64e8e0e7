//! Reading asset bytes: memory-mapped for large files, buffered for small ones.

use std::fs::File;
use std::io::Read;
use std::ops::Deref;
use std::path::Path;

use memmap2::Mmap;

use crate::error::FingerprintError;

/// The full contents of an asset file.
///
/// Dereferences to `&[u8]` regardless of how the bytes were obtained.
pub enum AssetBytes {
    /// A read-only memory map of the whole file.
    Mapped(Mmap),
    /// The file read into memory.
    Buffered(Vec<u8>),
}

impl AssetBytes {
    /// Opens `path`, mapping it if its size is at least `mmap_threshold`.
    ///
    /// Fails with [`FingerprintError::Truncated`] if the bytes obtained do not
    /// match the size the filesystem reports.
    pub fn open(path: &Path, mmap_threshold: u64) -> Result<Self, FingerprintError> {
        let read_err = |source| FingerprintError::Read {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(read_err)?;
        let expected = file.metadata().map_err(read_err)?.len();

        let bytes = if expected > 0 && expected >= mmap_threshold {
            // SAFETY: the map is read-only and dropped before the run ends.
            // Assets are not modified by this process; concurrent external
            // truncation is outside the supported operating envelope.
            let map = unsafe { Mmap::map(&file) }.map_err(read_err)?;
            AssetBytes::Mapped(map)
        } else {
            let mut buf = Vec::with_capacity(expected as usize);
            file.read_to_end(&mut buf).map_err(read_err)?;
            AssetBytes::Buffered(buf)
        };

        let actual = bytes.len() as u64;
        if actual != expected {
            return Err(FingerprintError::Truncated {
                path: path.to_path_buf(),
                expected,
                actual,
            });
        }
        Ok(bytes)
    }

    /// Returns `true` if the bytes are memory-mapped.
    pub fn is_mapped(&self) -> bool {
        matches!(self, AssetBytes::Mapped(_))
    }
}

impl Deref for AssetBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            AssetBytes::Mapped(map) => map,
            AssetBytes::Buffered(buf) => buf,
        }
    }
}
