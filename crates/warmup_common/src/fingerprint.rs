//! Fixed-width content fingerprints and the fidelity modes that produce them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 64-bit content fingerprint used for change detection.
///
/// Two assets with the same `Fingerprint` under the same [`FingerprintMode`]
/// are assumed to have identical content. Fingerprints produced under
/// different modes are never comparable.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    /// Returns the raw 64-bit value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({:08x}..)", self.0 >> 32)
    }
}

/// How much of an asset's content contributes to its fingerprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FingerprintMode {
    /// Every byte is hashed. Any content change is detected.
    Exhaustive,
    /// Only head, middle, and tail windows are hashed together with the total
    /// length. Changes confined to the unsampled region go undetected.
    Sampled,
}

impl FingerprintMode {
    /// Returns the lowercase tag used in reports and statistics.
    pub fn as_str(self) -> &'static str {
        match self {
            FingerprintMode::Exhaustive => "exhaustive",
            FingerprintMode::Sampled => "sampled",
        }
    }
}

impl fmt::Display for FingerprintMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
