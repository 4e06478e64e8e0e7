//! Shared foundational types used across the warmup pipeline.
//!
//! This crate provides the asset identity and record types, the closed set of
//! asset kinds recognized by the magic-byte probe, and the fixed-width
//! fingerprint value stored in startup caches.

#![warn(missing_docs)]

pub mod asset;
pub mod fingerprint;

pub use asset::{normalize_relative, AssetKind, AssetRecord, HeaderStatus, PACKAGE_MAGIC};
pub use fingerprint::{Fingerprint, FingerprintMode};
