//! Summary statistics over a loaded cache.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use warmup_common::{AssetKind, AssetRecord, Fingerprint, FingerprintMode};

use crate::format::StartupCache;

/// Assets whose content fingerprints are identical.
///
/// For sampled fingerprints this is a strong hint, not proof: only the
/// sampled windows and the size are known to match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// The shared fingerprint.
    pub fingerprint: Fingerprint,
    /// Size of each copy in bytes.
    pub size: u64,
    /// Paths sharing the content, sorted.
    pub paths: Vec<String>,
}

impl DuplicateGroup {
    /// Bytes that would be saved by keeping a single copy.
    pub fn wasted_bytes(&self) -> u64 {
        self.size * (self.paths.len() as u64).saturating_sub(1)
    }
}

/// Groups fingerprinted assets sharing both fingerprint and size, largest
/// waste first. Assets without a fingerprint are ignored.
pub fn find_duplicates(assets: &[AssetRecord]) -> Vec<DuplicateGroup> {
    let mut groups: BTreeMap<(Fingerprint, u64), Vec<String>> = BTreeMap::new();
    for asset in assets {
        if let Some(fp) = asset.fingerprint {
            groups
                .entry((fp, asset.size))
                .or_default()
                .push(asset.path.clone());
        }
    }

    let mut duplicates: Vec<DuplicateGroup> = groups
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|((fingerprint, size), mut paths)| {
            paths.sort();
            DuplicateGroup {
                fingerprint,
                size,
                paths,
            }
        })
        .collect();
    duplicates.sort_by(|a, b| {
        b.wasted_bytes()
            .cmp(&a.wasted_bytes())
            .then_with(|| a.paths.cmp(&b.paths))
    });
    duplicates
}

/// Count and byte total for one asset kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindTotals {
    /// Number of assets.
    pub count: usize,
    /// Sum of their sizes.
    pub bytes: u64,
}

/// What `stats` reports about a cache file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Format version recorded in the file.
    pub version: String,
    /// Creation time in seconds since the Unix epoch.
    pub created_at: u64,
    /// Project identifier.
    pub project: String,
    /// Fingerprint fidelity.
    pub fingerprint_mode: FingerprintMode,
    /// Number of assets.
    pub asset_count: usize,
    /// Number of startup-critical assets.
    pub critical_count: usize,
    /// Sum of asset sizes.
    pub total_bytes: u64,
    /// Sum of startup-critical asset sizes.
    pub critical_bytes: u64,
    /// Size of the cache file itself.
    pub encoded_size: u64,
    /// Per-kind totals.
    pub by_kind: BTreeMap<AssetKind, KindTotals>,
    /// Number of extension blobs carried.
    pub extension_count: usize,
    /// Groups of byte-identical assets, largest waste first.
    pub duplicates: Vec<DuplicateGroup>,
}

impl CacheStats {
    /// Computes statistics for `cache`, whose encoded form is `encoded_size` bytes.
    pub fn compute(cache: &StartupCache, encoded_size: u64) -> Self {
        let mut by_kind: BTreeMap<AssetKind, KindTotals> = BTreeMap::new();
        for asset in &cache.assets {
            let totals = by_kind.entry(asset.kind).or_default();
            totals.count += 1;
            totals.bytes += asset.size;
        }

        Self {
            version: cache.version.clone(),
            created_at: cache.created_at,
            project: cache.project.clone(),
            fingerprint_mode: cache.fingerprint_mode,
            asset_count: cache.assets.len(),
            critical_count: cache.critical_count(),
            total_bytes: cache.assets.iter().map(|a| a.size).sum(),
            critical_bytes: cache
                .assets
                .iter()
                .filter(|a| a.startup_critical)
                .map(|a| a.size)
                .sum(),
            encoded_size,
            by_kind,
            extension_count: cache.extensions.len(),
            duplicates: find_duplicates(&cache.assets),
        }
    }

    /// Total bytes recoverable by deduplicating identical assets.
    pub fn wasted_bytes(&self) -> u64 {
        self.duplicates.iter().map(DuplicateGroup::wasted_bytes).sum()
    }
}
