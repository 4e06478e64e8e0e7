//! Content fingerprinting for change detection.
//!
//! Two fidelity modes share one 4-lane streaming accumulator:
//!
//! - [`FingerprintMode::Exhaustive`] feeds every byte through the lanes in
//!   32-byte stripes, with a scalar pass for the short tail.
//! - [`FingerprintMode::Sampled`] feeds only a head, middle, and tail window
//!   plus the total length. It is much cheaper on large files but **cannot see
//!   changes outside the three windows**: an edit confined to the unsampled
//!   region produces the same fingerprint. Use it for fast drift heuristics,
//!   never as proof that content is unchanged.
//!
//! The stripe loop is a pluggable [`Kernel`]. The portable scalar kernel is
//! the default; the wide kernel is an optional acceleration that must produce
//! bit-identical output.

#![warn(missing_docs)]

pub mod error;
pub mod fingerprinter;
pub mod hasher;
pub mod kernel;
pub mod source;

pub use error::FingerprintError;
pub use fingerprinter::{sample_windows, Fingerprinter};
pub use hasher::LaneHasher;
pub use kernel::{BlockKernel, Kernel, ScalarKernel, WideKernel, STRIPE_LEN};
pub use source::AssetBytes;
pub use warmup_common::{Fingerprint, FingerprintMode};
