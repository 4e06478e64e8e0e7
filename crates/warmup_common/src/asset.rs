//! Asset identity, kind classification, and the per-asset record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::fingerprint::Fingerprint;

/// Package container signature, stored little-endian at offset 0.
pub const PACKAGE_MAGIC: u32 = 0x9E2A_83C1;

/// The declared type of an asset, derived from a 4-byte magic probe.
///
/// The set is closed: new container formats are added as variants here.
/// Files whose signature is not recognized are tracked as [`AssetKind::Unknown`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    /// A package container (`.uasset` and friends).
    Package,
    /// A package container holding a level (`.umap`).
    Map,
    /// A PNG or DDS image.
    Texture,
    /// A RIFF/WAVE or Ogg audio stream.
    Audio,
    /// Any other file. Tracked and fingerprinted, never header-parsed.
    Unknown,
}

impl AssetKind {
    /// All kinds, in report order.
    pub const ALL: [AssetKind; 5] = [
        AssetKind::Package,
        AssetKind::Map,
        AssetKind::Texture,
        AssetKind::Audio,
        AssetKind::Unknown,
    ];

    /// Classifies a file from its first four bytes and its extension.
    ///
    /// The extension only disambiguates between variants sharing a signature
    /// (packages vs. maps); it never overrides the magic bytes.
    pub fn probe(magic: [u8; 4], extension: Option<&str>) -> Self {
        if u32::from_le_bytes(magic) == PACKAGE_MAGIC {
            return match extension {
                Some(ext) if ext.eq_ignore_ascii_case("umap") => AssetKind::Map,
                _ => AssetKind::Package,
            };
        }
        match &magic {
            b"\x89PNG" | b"DDS " => AssetKind::Texture,
            b"RIFF" | b"OggS" => AssetKind::Audio,
            _ => AssetKind::Unknown,
        }
    }

    /// Returns `true` for kinds whose header declares dependency references.
    pub fn has_header(self) -> bool {
        matches!(self, AssetKind::Package | AssetKind::Map)
    }

    /// Returns the lowercase tag used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::Package => "package",
            AssetKind::Map => "map",
            AssetKind::Texture => "texture",
            AssetKind::Audio => "audio",
            AssetKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the bounded header parse for one asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeaderStatus {
    /// The asset kind carries no parseable header.
    NotApplicable,
    /// The header was parsed and its references collected.
    Parsed,
    /// The header could not be interpreted. The asset has no outgoing edges.
    Failed,
}

/// One tracked asset, keyed by its project-relative path.
///
/// Created by the scanner, fingerprinted by the orchestrator, and flagged
/// startup-critical by graph analysis. A record is never mutated after the
/// run that produced it completes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Project-relative path with `/` separators. Unique within a run.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time in nanoseconds since the Unix epoch.
    pub modified_ns: u64,
    /// Declared type from the magic probe.
    pub kind: AssetKind,
    /// Header parse outcome.
    pub header: HeaderStatus,
    /// Content fingerprint, absent until the fingerprint stage has run.
    pub fingerprint: Option<Fingerprint>,
    /// Set when the asset is reachable from an entry asset.
    pub startup_critical: bool,
}

/// Converts a path below `root` into the `/`-separated identity string.
///
/// Returns `None` if `path` does not live under `root`.
pub fn normalize_relative(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}
