//! The `fingerprint(bytes, mode)` entry points.

use std::ops::Range;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use warmup_common::{Fingerprint, FingerprintMode};

use crate::error::FingerprintError;
use crate::hasher::LaneHasher;
use crate::kernel::Kernel;
use crate::source::AssetBytes;

const EXHAUSTIVE_SEED: u64 = 0;
// Distinct seed so a sampled fingerprint can never be mistaken for an
// exhaustive one of the same bytes.
const SAMPLED_SEED: u64 = 0x5A4D_504C_4544_3031;

/// Default window size for sampled fingerprints.
pub const DEFAULT_SAMPLE_WINDOW: usize = 64 * 1024;

/// Default size at or above which files are memory-mapped.
pub const DEFAULT_MMAP_THRESHOLD: u64 = 64 * 1024;

/// Computes the head, middle, and tail windows for a sampled fingerprint.
///
/// Returns `None` when `len <= 3 * window`, in which case the whole input is
/// hashed instead. Windows never extend past `len`.
pub fn sample_windows(len: usize, window: usize) -> Option<[Range<usize>; 3]> {
    if window == 0 || len <= window.saturating_mul(3) {
        return None;
    }
    let mid = (len - window) / 2;
    Some([0..window, mid..mid + window, len - window..len])
}

/// Fingerprints byte buffers and files in either fidelity mode.
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    kernel: Kernel,
    sample_window: usize,
    mmap_threshold: u64,
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new(Kernel::Scalar, DEFAULT_SAMPLE_WINDOW, DEFAULT_MMAP_THRESHOLD)
    }
}

impl Fingerprinter {
    /// Creates a fingerprinter.
    ///
    /// A `sample_window` of zero is treated as one byte.
    pub fn new(kernel: Kernel, sample_window: usize, mmap_threshold: u64) -> Self {
        Self {
            kernel,
            sample_window: sample_window.max(1),
            mmap_threshold,
        }
    }

    /// The stripe kernel in use.
    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// The sampled-mode window size in bytes.
    pub fn sample_window(&self) -> usize {
        self.sample_window
    }

    /// Fingerprints an in-memory byte buffer.
    ///
    /// In [`FingerprintMode::Sampled`] only the three windows returned by
    /// [`sample_windows`] contribute, so edits outside them go unnoticed.
    pub fn fingerprint(&self, bytes: &[u8], mode: FingerprintMode) -> Fingerprint {
        match mode {
            FingerprintMode::Exhaustive => {
                let mut hasher = LaneHasher::with_kernel(EXHAUSTIVE_SEED, self.kernel);
                hasher.update(bytes);
                Fingerprint(hasher.finish())
            }
            FingerprintMode::Sampled => {
                let mut hasher = LaneHasher::with_kernel(SAMPLED_SEED, self.kernel);
                match sample_windows(bytes.len(), self.sample_window) {
                    Some(windows) => {
                        for window in windows {
                            hasher.update(&bytes[window]);
                        }
                    }
                    None => hasher.update(bytes),
                }
                hasher.update(&(bytes.len() as u64).to_le_bytes());
                Fingerprint(hasher.finish())
            }
        }
    }

    /// Reads `path` in full and fingerprints it.
    ///
    /// Large files are memory-mapped; in sampled mode only the windowed pages
    /// are touched.
    pub fn fingerprint_file(
        &self,
        path: &Path,
        mode: FingerprintMode,
    ) -> Result<Fingerprint, FingerprintError> {
        let bytes = AssetBytes::open(path, self.mmap_threshold)?;
        Ok(self.fingerprint(&bytes, mode))
    }

    /// Fingerprints many files in parallel on the current rayon pool.
    ///
    /// Results are returned in input order; one failure does not affect others.
    pub fn fingerprint_files(
        &self,
        paths: &[PathBuf],
        mode: FingerprintMode,
    ) -> Vec<Result<Fingerprint, FingerprintError>> {
        paths
            .par_iter()
            .map(|path| self.fingerprint_file(path, mode))
            .collect()
    }
}
