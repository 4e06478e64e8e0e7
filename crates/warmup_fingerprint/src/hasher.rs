//! Streaming 4-lane accumulator.

use crate::kernel::{
    read_u64, round, BlockKernel, Kernel, PRIME64_1, PRIME64_2, PRIME64_3, PRIME64_4, PRIME64_5,
    STRIPE_LEN,
};

/// Incremental hasher over an arbitrary byte stream.
///
/// Bytes may be fed in chunks of any size. Whole 32-byte stripes go through
/// the configured [`Kernel`]; up to 31 leftover bytes are buffered and handled
/// by a scalar tail pass in [`finish`](Self::finish). The result therefore
/// depends only on the concatenated input and the seed, never on chunking.
#[derive(Debug, Clone)]
pub struct LaneHasher {
    seed: u64,
    lanes: [u64; 4],
    buffer: [u8; STRIPE_LEN],
    buffered: usize,
    total_len: u64,
    kernel: Kernel,
}

impl LaneHasher {
    /// Creates a hasher with the given seed using the scalar kernel.
    pub fn new(seed: u64) -> Self {
        Self::with_kernel(seed, Kernel::Scalar)
    }

    /// Creates a hasher with the given seed and stripe kernel.
    pub fn with_kernel(seed: u64, kernel: Kernel) -> Self {
        Self {
            seed,
            lanes: [
                seed.wrapping_add(PRIME64_1).wrapping_add(PRIME64_2),
                seed.wrapping_add(PRIME64_2),
                seed,
                seed.wrapping_sub(PRIME64_1),
            ],
            buffer: [0; STRIPE_LEN],
            buffered: 0,
            total_len: 0,
            kernel,
        }
    }

    /// Total number of bytes fed so far.
    pub fn total_len(&self) -> u64 {
        self.total_len
    }

    /// Feeds more bytes into the hasher.
    pub fn update(&mut self, mut data: &[u8]) {
        self.total_len += data.len() as u64;

        if self.buffered > 0 {
            let take = (STRIPE_LEN - self.buffered).min(data.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&data[..take]);
            self.buffered += take;
            data = &data[take..];
            if self.buffered < STRIPE_LEN {
                return;
            }
            let stripe = self.buffer;
            self.kernel.absorb(&mut self.lanes, &stripe);
            self.buffered = 0;
        }

        let whole = data.len() - data.len() % STRIPE_LEN;
        if whole > 0 {
            self.kernel.absorb(&mut self.lanes, &data[..whole]);
        }

        let rest = &data[whole..];
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buffered = rest.len();
    }

    /// Merges the lanes, mixes in the total length and the tail, and returns the hash.
    pub fn finish(&self) -> u64 {
        let mut h = if self.total_len >= STRIPE_LEN as u64 {
            let [v1, v2, v3, v4] = self.lanes;
            let mut h = v1
                .rotate_left(1)
                .wrapping_add(v2.rotate_left(7))
                .wrapping_add(v3.rotate_left(12))
                .wrapping_add(v4.rotate_left(18));
            for v in self.lanes {
                h = merge_round(h, v);
            }
            h
        } else {
            self.seed.wrapping_add(PRIME64_5)
        };

        h = h.wrapping_add(self.total_len);
        h = tail_pass(h, &self.buffer[..self.buffered]);
        avalanche(h)
    }
}

fn merge_round(acc: u64, lane: u64) -> u64 {
    (acc ^ round(0, lane))
        .wrapping_mul(PRIME64_1)
        .wrapping_add(PRIME64_4)
}

// Scalar pass over the final partial stripe (< 32 bytes).
fn tail_pass(mut h: u64, tail: &[u8]) -> u64 {
    let mut words = tail.chunks_exact(8);
    for word in &mut words {
        h ^= round(0, read_u64(word, 0));
        h = h.rotate_left(27).wrapping_mul(PRIME64_1).wrapping_add(PRIME64_4);
    }

    let mut rest = words.remainder();
    if rest.len() >= 4 {
        let half = u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]) as u64;
        h ^= half.wrapping_mul(PRIME64_1);
        h = h.rotate_left(23).wrapping_mul(PRIME64_2).wrapping_add(PRIME64_3);
        rest = &rest[4..];
    }

    for &byte in rest {
        h ^= (byte as u64).wrapping_mul(PRIME64_5);
        h = h.rotate_left(11).wrapping_mul(PRIME64_1);
    }
    h
}

fn avalanche(mut h: u64) -> u64 {
    h ^= h >> 33;
    h = h.wrapping_mul(PRIME64_2);
    h ^= h >> 29;
    h = h.wrapping_mul(PRIME64_3);
    h ^= h >> 32;
    h
}
