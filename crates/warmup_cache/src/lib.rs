//! Versioned binary startup cache.
//!
//! A cache file records every scanned asset, the derived load order, and the
//! fingerprint mode used. [`write_cache`] replaces the destination atomically;
//! [`read_cache`] validates magic, version, and checksum before decoding.
//! [`is_cache_usable`] is the cheap consumer check and only looks at the magic.

#![warn(missing_docs)]

pub mod error;
pub mod format;
pub mod stats;
pub mod store;

pub use error::CacheError;
pub use format::{deserialize, has_magic, serialize, StartupCache, CACHE_MAGIC, FORMAT_VERSION};
pub use stats::{find_duplicates, CacheStats, DuplicateGroup, KindTotals};
pub use store::{is_cache_usable, read_cache, write_cache};
