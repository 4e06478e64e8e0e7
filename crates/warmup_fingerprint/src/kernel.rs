//! Stripe kernels: the hot loop of the exhaustive fingerprint.

pub(crate) const PRIME64_1: u64 = 0x9E37_79B1_85EB_CA87;
pub(crate) const PRIME64_2: u64 = 0xC2B2_AE3D_27D4_EB4F;
pub(crate) const PRIME64_3: u64 = 0x1656_67B1_9E37_79F9;
pub(crate) const PRIME64_4: u64 = 0x85EB_CA77_C2B2_AE63;
pub(crate) const PRIME64_5: u64 = 0x27D4_EB2F_1656_67C5;

/// Bytes consumed per stripe: one 64-bit word for each of the four lanes.
pub const STRIPE_LEN: usize = 32;

#[inline(always)]
pub(crate) fn round(acc: u64, input: u64) -> u64 {
    acc.wrapping_add(input.wrapping_mul(PRIME64_2))
        .rotate_left(31)
        .wrapping_mul(PRIME64_1)
}

#[inline(always)]
pub(crate) fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(word)
}

/// A strategy for folding whole stripes into the four lane accumulators.
///
/// Implementations must be observationally identical: for any lane state and
/// any stripe-aligned input, every kernel leaves the lanes in the same state.
pub trait BlockKernel {
    /// Folds `stripes` into `lanes`. `stripes.len()` is a multiple of [`STRIPE_LEN`].
    fn absorb(&self, lanes: &mut [u64; 4], stripes: &[u8]);
}

/// Portable kernel processing one stripe per iteration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarKernel;

impl BlockKernel for ScalarKernel {
    fn absorb(&self, lanes: &mut [u64; 4], stripes: &[u8]) {
        for stripe in stripes.chunks_exact(STRIPE_LEN) {
            for (lane, acc) in lanes.iter_mut().enumerate() {
                *acc = round(*acc, read_u64(stripe, lane * 8));
            }
        }
    }
}

/// Kernel processing four stripes per iteration with the lanes held in locals.
///
/// The four lane chains are independent, so unrolling across 128-byte groups
/// lets the CPU overlap the multiply latency of all lanes.
#[derive(Debug, Clone, Copy, Default)]
pub struct WideKernel;

impl BlockKernel for WideKernel {
    fn absorb(&self, lanes: &mut [u64; 4], stripes: &[u8]) {
        let [mut v1, mut v2, mut v3, mut v4] = *lanes;
        let mut groups = stripes.chunks_exact(STRIPE_LEN * 4);
        for group in &mut groups {
            for s in 0..4 {
                let base = s * STRIPE_LEN;
                v1 = round(v1, read_u64(group, base));
                v2 = round(v2, read_u64(group, base + 8));
                v3 = round(v3, read_u64(group, base + 16));
                v4 = round(v4, read_u64(group, base + 24));
            }
        }
        *lanes = [v1, v2, v3, v4];
        ScalarKernel.absorb(lanes, groups.remainder());
    }
}

/// Kernel selector carried by hashers and the fingerprinter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Kernel {
    /// [`ScalarKernel`].
    #[default]
    Scalar,
    /// [`WideKernel`].
    Wide,
}

impl Kernel {
    /// Every available kernel.
    pub const ALL: [Kernel; 2] = [Kernel::Scalar, Kernel::Wide];

    /// Returns the kernel's name.
    pub fn name(self) -> &'static str {
        match self {
            Kernel::Scalar => "scalar",
            Kernel::Wide => "wide",
        }
    }
}

impl BlockKernel for Kernel {
    fn absorb(&self, lanes: &mut [u64; 4], stripes: &[u8]) {
        match self {
            Kernel::Scalar => ScalarKernel.absorb(lanes, stripes),
            Kernel::Wide => WideKernel.absorb(lanes, stripes),
        }
    }
}
