//! Bloom filter primitive.
//!
//! A fixed-size probabilistic membership structure: false positives are
//! possible, false negatives are not. Bit positions are derived by double
//! hashing over two MurmurHash3 digests: `h(i) = h1 + i * h2 (mod m)`.
//!
//! The bit array is stored as a `BitVec<u8, Lsb0>` so the raw byte image can
//! be lifted out for the wire without re-packing.

use std::f64::consts::LN_2;
use std::io::Cursor;

use bitvec::prelude::*;

/// Hash an element with MurmurHash3 (x64, 128-bit) under a seed, keeping the
/// lower 64 bits.
fn murmur_hash(element: &[u8], seed: u32) -> u64 {
    let mut cursor = Cursor::new(element);
    murmur3::murmur3_x64_128(&mut cursor, seed).unwrap_or(0) as u64
}

/// Compute the k bit positions for an element.
///
/// Double hashing: two base hashes with distinct seeds generate all k
/// positions, which is cheaper than k independent hashes and preserves the
/// filter's false-positive bound.
fn hash_positions(element: &[u8], k: u32, m: u32) -> Vec<usize> {
    let h1 = murmur_hash(element, 0);
    let h2 = murmur_hash(element, 1);

    (0..k as u64)
        .map(|i| {
            let hash = h1.wrapping_add(i.wrapping_mul(h2));
            (hash % m as u64) as usize
        })
        .collect()
}

/// Optimal Bloom parameters for `capacity` elements at `target_fpr`.
///
/// Standard formulas: `m = -n*ln(p) / ln(2)^2`, `k = (m/n) * ln(2)`,
/// with k clamped to [1, 32].
pub fn optimal_params(capacity: usize, target_fpr: f64) -> (u32, u32) {
    if capacity == 0 {
        return (1, 1);
    }

    let n = capacity as f64;
    let m = (-n * target_fpr.ln() / (LN_2 * LN_2)).ceil() as u32;
    let k = ((m as f64 / n) * LN_2).round() as u32;

    (m.max(1), k.clamp(1, 32))
}

/// Bloom filter for probabilistic topic membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilter {
    /// Bit array (m bits).
    bits: BitVec<u8, Lsb0>,
    /// Number of hash functions (k).
    k: u32,
    /// Size in bits (m).
    m: u32,
    /// Number of elements inserted (n).
    n: usize,
}

impl BloomFilter {
    /// Create an empty filter with `m` bits and `k` hash functions.
    pub fn new(m: u32, k: u32) -> Self {
        Self {
            bits: bitvec![u8, Lsb0; 0; m as usize],
            k,
            m,
            n: 0,
        }
    }

    /// Create an empty filter sized for `capacity` elements at `target_fpr`.
    pub fn with_capacity(capacity: usize, target_fpr: f64) -> Self {
        let (m, k) = optimal_params(capacity, target_fpr);
        Self::new(m, k)
    }

    /// Reconstruct a filter from its wire parts.
    ///
    /// `bytes` must hold at least `ceil(bit_len/8)` bytes; the caller
    /// validates the exact length against the wire header.
    pub fn from_raw_parts(bit_len: u32, k: u32, bytes: &[u8]) -> Self {
        let mut bits = BitVec::<u8, Lsb0>::from_slice(bytes);
        bits.truncate(bit_len as usize);
        Self {
            bits,
            k,
            m: bit_len,
            n: 0,
        }
    }

    /// Insert an element. Afterwards `contains(element)` is guaranteed true.
    pub fn insert(&mut self, element: &[u8]) {
        for pos in hash_positions(element, self.k, self.m) {
            self.bits.set(pos, true);
        }
        self.n += 1;
    }

    /// Test whether an element might be in the set.
    ///
    /// `true` may be a false positive; `false` is definitive.
    pub fn contains(&self, element: &[u8]) -> bool {
        hash_positions(element, self.k, self.m)
            .iter()
            .all(|&pos| self.bits[pos])
    }

    /// Reset all bits to zero.
    pub fn clear(&mut self) {
        self.bits.fill(false);
        self.n = 0;
    }

    /// Filter size in bits (m).
    pub fn bit_len(&self) -> u32 {
        self.m
    }

    /// Number of hash functions (k).
    pub fn hash_count(&self) -> u32 {
        self.k
    }

    /// Number of elements inserted since creation or the last clear.
    pub fn elements_inserted(&self) -> usize {
        self.n
    }

    /// Raw byte image of the bit array, `ceil(m/8)` bytes.
    pub fn as_raw_bytes(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }

    /// Estimated false positive rate at the current fill.
    ///
    /// FPR = (1 - e^(-kn/m))^k
    pub fn false_positive_rate(&self) -> f64 {
        if self.m == 0 {
            return 1.0;
        }
        let exponent = -(self.k as f64) * (self.n as f64) / (self.m as f64);
        (1.0 - exponent.exp()).powi(self.k as i32)
    }
}
