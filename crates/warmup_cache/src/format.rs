//! The on-disk cache container.
//!
//! Layout:
//!
//! ```text
//! magic[8] = "UEFAST01"
//! bincode(String)  format version, "MAJOR.MINOR"
//! bincode(u64)     xxh3-64 of the payload
//! payload          bincode(CacheBody) followed by any trailing bytes
//! ```
//!
//! Readers accept any version with a major number they know. Fields added by
//! a newer minor revision are appended after the body; a reader that does not
//! understand them keeps them as opaque trailing bytes and writes them back
//! unchanged.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use warmup_common::{AssetRecord, FingerprintMode};
use xxhash_rust::xxh3::xxh3_64;

use crate::error::CacheError;

/// Magic token at the start of every cache file.
pub const CACHE_MAGIC: &[u8; 8] = b"UEFAST01";

/// Format version written by this build.
pub const FORMAT_VERSION: &str = "1.0";

const SUPPORTED_MAJOR: u32 = 1;

/// The persisted startup cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupCache {
    /// Format version, `"MAJOR.MINOR"`.
    pub version: String,
    /// Creation time in seconds since the Unix epoch.
    pub created_at: u64,
    /// Project identifier.
    pub project: String,
    /// Fidelity of the recorded fingerprints.
    pub fingerprint_mode: FingerprintMode,
    /// Every asset, in path order.
    pub assets: Vec<AssetRecord>,
    /// Asset paths in load order.
    pub load_order: Vec<String>,
    /// Named extension blobs carried through unchanged.
    pub extensions: BTreeMap<String, Vec<u8>>,
    /// Bytes found after the known body. Preserved verbatim.
    pub trailing: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct CacheBody {
    created_at: u64,
    project: String,
    fingerprint_mode: FingerprintMode,
    assets: Vec<AssetRecord>,
    load_order: Vec<String>,
    extensions: BTreeMap<String, Vec<u8>>,
}

impl StartupCache {
    /// Creates a cache stamped with the current format version and time.
    pub fn new(
        project: impl Into<String>,
        fingerprint_mode: FingerprintMode,
        assets: Vec<AssetRecord>,
        load_order: Vec<String>,
    ) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            version: FORMAT_VERSION.to_string(),
            created_at,
            project: project.into(),
            fingerprint_mode,
            assets,
            load_order,
            extensions: BTreeMap::new(),
            trailing: Vec::new(),
        }
    }

    /// Looks up an asset record by path.
    pub fn asset(&self, path: &str) -> Option<&AssetRecord> {
        self.assets
            .binary_search_by(|a| a.path.as_str().cmp(path))
            .ok()
            .map(|i| &self.assets[i])
    }

    /// Number of assets flagged startup-critical.
    pub fn critical_count(&self) -> usize {
        self.assets.iter().filter(|a| a.startup_critical).count()
    }
}

/// Encodes a cache into its container bytes.
pub fn serialize(cache: &StartupCache) -> Result<Vec<u8>, CacheError> {
    let config = bincode::config::standard();
    let encode_err = |e: bincode::error::EncodeError| CacheError::Serialization {
        reason: e.to_string(),
    };

    let body = CacheBody {
        created_at: cache.created_at,
        project: cache.project.clone(),
        fingerprint_mode: cache.fingerprint_mode,
        assets: cache.assets.clone(),
        load_order: cache.load_order.clone(),
        extensions: cache.extensions.clone(),
    };
    let mut payload = bincode::serde::encode_to_vec(&body, config).map_err(encode_err)?;
    payload.extend_from_slice(&cache.trailing);

    let version = bincode::serde::encode_to_vec(&cache.version, config).map_err(encode_err)?;
    let checksum = bincode::serde::encode_to_vec(xxh3_64(&payload), config).map_err(encode_err)?;

    let mut out =
        Vec::with_capacity(CACHE_MAGIC.len() + version.len() + checksum.len() + payload.len());
    out.extend_from_slice(CACHE_MAGIC);
    out.extend_from_slice(&version);
    out.extend_from_slice(&checksum);
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decodes and validates container bytes.
///
/// Checks run in order: magic, version, checksum, body.
pub fn deserialize(bytes: &[u8]) -> Result<StartupCache, CacheError> {
    let rest = bytes
        .strip_prefix(CACHE_MAGIC.as_slice())
        .ok_or(CacheError::BadMagic)?;
    let config = bincode::config::standard();

    let (version, used): (String, usize) = bincode::serde::decode_from_slice(rest, config)
        .map_err(|e| corrupt(format!("unreadable version: {e}")))?;
    check_version(&version)?;
    let rest = &rest[used..];

    let (checksum, used): (u64, usize) = bincode::serde::decode_from_slice(rest, config)
        .map_err(|e| corrupt(format!("unreadable checksum: {e}")))?;
    let payload = &rest[used..];
    let actual = xxh3_64(payload);
    if actual != checksum {
        return Err(corrupt(format!(
            "checksum mismatch: recorded {checksum:016x}, computed {actual:016x}"
        )));
    }

    let (body, used): (CacheBody, usize) = bincode::serde::decode_from_slice(payload, config)
        .map_err(|e| corrupt(format!("undecodable body: {e}")))?;

    Ok(StartupCache {
        version,
        created_at: body.created_at,
        project: body.project,
        fingerprint_mode: body.fingerprint_mode,
        assets: body.assets,
        load_order: body.load_order,
        extensions: body.extensions,
        trailing: payload[used..].to_vec(),
    })
}

/// Returns `true` if `bytes` begins with the cache magic token.
pub fn has_magic(bytes: &[u8]) -> bool {
    bytes.starts_with(CACHE_MAGIC)
}

fn check_version(version: &str) -> Result<(), CacheError> {
    let major = version
        .split_once('.')
        .and_then(|(major, minor)| {
            minor.parse::<u32>().ok()?;
            major.parse::<u32>().ok()
        })
        .ok_or_else(|| corrupt(format!("malformed version {version:?}")))?;
    if major > SUPPORTED_MAJOR {
        return Err(CacheError::UnsupportedVersion {
            found: version.to_string(),
            supported: FORMAT_VERSION.to_string(),
        });
    }
    Ok(())
}

fn corrupt(reason: String) -> CacheError {
    CacheError::CorruptBody { reason }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use warmup_common::{AssetKind, Fingerprint, HeaderStatus};

    pub(crate) fn asset(path: &str, size: u64, fp: u64, critical: bool) -> AssetRecord {
        AssetRecord {
            path: path.to_string(),
            size,
            modified_ns: 1_700_000_000_000_000_000,
            kind: AssetKind::Package,
            header: HeaderStatus::Parsed,
            fingerprint: Some(Fingerprint(fp)),
            startup_critical: critical,
        }
    }

    pub(crate) fn sample_cache() -> StartupCache {
        StartupCache::new(
            "ShooterGame",
            FingerprintMode::Exhaustive,
            vec![
                asset("Content/A.uasset", 100, 0xAAAA, true),
                asset("Content/B.uasset", 200, 0xBBBB, false),
            ],
            vec!["Content/A.uasset".into(), "Content/B.uasset".into()],
        )
    }

    // Rebuilds a container with a different version string and a valid checksum.
    fn with_version(cache: &StartupCache, version: &str) -> Vec<u8> {
        let mut c = cache.clone();
        c.version = version.to_string();
        serialize(&c).unwrap()
    }

    #[test]
    fn round_trip_preserves_everything() {
        let cache = sample_cache();
        let bytes = serialize(&cache).unwrap();
        assert!(bytes.starts_with(b"UEFAST01"));
        let back = deserialize(&bytes).unwrap();
        assert_eq!(back, cache);
        assert_eq!(serialize(&back).unwrap(), bytes);
    }

    #[test]
    fn extensions_and_trailing_bytes_survive() {
        let mut cache = sample_cache();
        cache
            .extensions
            .insert("shader_variants".into(), vec![1, 2, 3, 4]);
        cache.trailing = b"future fields".to_vec();
        let bytes = serialize(&cache).unwrap();
        let back = deserialize(&bytes).unwrap();
        assert_eq!(back.extensions["shader_variants"], vec![1, 2, 3, 4]);
        assert_eq!(back.trailing, b"future fields");
        assert_eq!(serialize(&back).unwrap(), bytes);
    }

    #[test]
    fn short_input_is_bad_magic() {
        for input in [&b""[..], b"UEFAST0", b"UEF"] {
            assert!(matches!(deserialize(input), Err(CacheError::BadMagic)));
        }
    }

    #[test]
    fn wrong_magic_is_bad_magic() {
        let mut bytes = serialize(&sample_cache()).unwrap();
        bytes[0] = b'X';
        assert!(matches!(deserialize(&bytes), Err(CacheError::BadMagic)));
        assert!(!has_magic(&bytes));
    }

    #[test]
    fn newer_major_is_rejected() {
        let bytes = with_version(&sample_cache(), "2.0");
        match deserialize(&bytes) {
            Err(CacheError::UnsupportedVersion { found, supported }) => {
                assert_eq!(found, "2.0");
                assert_eq!(supported, FORMAT_VERSION);
            }
            other => panic!("expected UnsupportedVersion, got {other:?}"),
        }
    }

    #[test]
    fn newer_minor_is_accepted() {
        let bytes = with_version(&sample_cache(), "1.7");
        let back = deserialize(&bytes).unwrap();
        assert_eq!(back.version, "1.7");
    }

    #[test]
    fn malformed_version_is_corrupt() {
        let bytes = with_version(&sample_cache(), "one");
        assert!(matches!(
            deserialize(&bytes),
            Err(CacheError::CorruptBody { .. })
        ));
    }

    #[test]
    fn flipped_payload_byte_is_corrupt() {
        let mut bytes = serialize(&sample_cache()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(matches!(
            deserialize(&bytes),
            Err(CacheError::CorruptBody { .. })
        ));
    }

    #[test]
    fn truncated_body_is_corrupt() {
        let bytes = serialize(&sample_cache()).unwrap();
        for cut in [8, 9, 12, bytes.len() / 2] {
            assert!(matches!(
                deserialize(&bytes[..cut]),
                Err(CacheError::CorruptBody { .. })
            ));
        }
    }

    #[test]
    fn asset_lookup_and_counts() {
        let cache = sample_cache();
        assert_eq!(cache.asset("Content/B.uasset").unwrap().size, 200);
        assert!(cache.asset("Content/C.uasset").is_none());
        assert_eq!(cache.critical_count(), 1);
        assert_eq!(cache.version, FORMAT_VERSION);
        assert!(cache.created_at > 0);
    }
}
