//! Configuration types deserialized from `warmup.toml`.

use serde::Deserialize;

/// The top-level pipeline configuration parsed from `warmup.toml`.
///
/// Every section is optional; absent sections take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WarmupConfig {
    /// Project identification.
    #[serde(default)]
    pub project: ProjectSection,
    /// Directory walk and header probe settings.
    #[serde(default)]
    pub scan: ScanConfig,
    /// Fingerprint window and kernel settings.
    #[serde(default)]
    pub fingerprint: FingerprintConfig,
    /// Entry assets that seed startup-critical classification.
    #[serde(default)]
    pub startup: StartupConfig,
    /// Drift verification settings.
    #[serde(default)]
    pub verify: VerifyConfig,
}

/// Project identification recorded in the cache.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    /// Project identifier. Defaults to the project root's directory name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Scanner settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Worker thread count. `0` means one per available hardware thread.
    pub threads: usize,
    /// Directory names skipped anywhere in the tree.
    pub exclude: Vec<String>,
    /// Whether dot-files and dot-directories are scanned.
    pub include_hidden: bool,
    /// Upper bound on the number of header bytes read per package.
    pub max_header_bytes: usize,
    /// Files at or above this size are memory-mapped instead of read.
    pub mmap_threshold: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            exclude: vec![
                "Binaries".to_string(),
                "DerivedDataCache".to_string(),
                "Intermediate".to_string(),
                "Saved".to_string(),
            ],
            include_hidden: false,
            max_header_bytes: 1024 * 1024,
            mmap_threshold: 64 * 1024,
        }
    }
}

/// Block-kernel selection for the exhaustive fingerprint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelChoice {
    /// Portable one-block-at-a-time kernel.
    #[default]
    Scalar,
    /// Four-blocks-per-iteration kernel. Produces identical fingerprints.
    Wide,
}

/// Fingerprinter settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FingerprintConfig {
    /// Size in bytes of each of the three sampled windows.
    pub sample_window: usize,
    /// Block kernel used by exhaustive fingerprinting.
    pub kernel: KernelChoice,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            sample_window: 64 * 1024,
            kernel: KernelChoice::Scalar,
        }
    }
}

/// Startup-critical classification settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StartupConfig {
    /// Project-relative paths of assets loaded at startup.
    pub entries: Vec<String>,
    /// Whether every map asset counts as an entry.
    pub maps_are_entries: bool,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            maps_are_entries: true,
        }
    }
}

/// Drift verifier settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifyConfig {
    /// Whether quick verify also compares sampled fingerprints when the cache
    /// was built in sampled mode.
    pub quick_sample: bool,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self { quick_sample: true }
    }
}

impl WarmupConfig {
    /// Returns the effective worker count, resolving `0` to the available parallelism.
    pub fn worker_threads(&self) -> usize {
        if self.scan.threads > 0 {
            return self.scan.threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}
