// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! The hashing convention shared by every filter in this crate.
//!
//! Every membership and frequency structure derives its probe positions
//! from two 32-bit base hashes combined by double hashing
//! (Kirsch-Mitzenmacher): `position_i = (h1 + i * h2) mod m`.

mod murmurhash;

pub use self::murmurhash::murmur3_32;

use std::hash::Hasher;

use twox_hash::XxHash64;

/// The seed 9001 used in the sketch update methods is a prime number that was chosen very early
/// on in experimental testing.
///
/// Choosing a seed is somewhat arbitrary, and the author cannot prove that this particular seed
/// is somehow superior to other seeds. There was some early Internet discussion that a seed of 0
/// did not produce as clean avalanche diagrams as non-zero seeds, but this may have been more
/// related to the MurmurHash2 release, which did have some issues. As far as the author can
/// determine, MurmurHash3 does not have these problems.
///
/// In order to perform set operations on two sketches it is critical that the same hash function
/// and seed are identical for both sketches, otherwise the assumed 1:1 relationship between the
/// original source key value and the hashed bit string would be violated. Once you have developed
/// a history of stored sketches you are stuck with it.
pub(crate) const DEFAULT_SKETCH_SEED: u32 = 9001;

/// Hashes `data` with XXHash64 under the given seed.
pub(crate) fn xxhash64(data: &[u8], seed: u64) -> u64 {
    let mut hasher = XxHash64::with_seed(seed);
    hasher.write(data);
    hasher.finish()
}

/// The two base hashes every probe sequence is derived from.
///
/// # Examples
///
/// ```
/// # use proximate::hash::HashPair;
/// let pair = HashPair::of(b"apple");
/// let first = pair.index(0, 1024);
/// let second = pair.index(1, 1024);
/// assert!(first < 1024 && second < 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashPair {
    /// First base hash (MurmurHash3 x86_32 under the crate seed).
    pub h1: u32,
    /// Second base hash (XXHash64 seeded with `h1`, truncated).
    pub h2: u32,
}

impl HashPair {
    /// Computes the two base hashes of an item.
    ///
    /// `h1` comes from MurmurHash3; `h2` comes from XXHash64 seeded with
    /// `h1`, so the pair behaves like two independent hash functions.
    pub fn of(item: &[u8]) -> Self {
        let h1 = murmur3_32(item, DEFAULT_SKETCH_SEED);
        let h2 = xxhash64(item, u64::from(h1)) as u32;
        HashPair { h1, h2 }
    }

    /// Computes a base pair by splitting a single XXHash64 value in two.
    ///
    /// `h2` is forced odd so that the probe stride is coprime with
    /// power-of-two widths. Used by the Count-Min sketch rows.
    pub fn split64(item: &[u8]) -> Self {
        let h = xxhash64(item, u64::from(DEFAULT_SKETCH_SEED));
        HashPair {
            h1: (h >> 32) as u32,
            h2: (h as u32) | 1,
        }
    }

    /// The i-th probe position in `[0, m)` by double hashing.
    ///
    /// The combination runs in wrapping 64-bit arithmetic so that large
    /// `i * h2` products fold instead of biasing the modulus.
    #[inline]
    pub fn index(&self, i: u32, m: u64) -> u64 {
        u64::from(self.h1).wrapping_add(u64::from(i).wrapping_mul(u64::from(self.h2))) % m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_deterministic() {
        assert_eq!(HashPair::of(b"apple"), HashPair::of(b"apple"));
        assert_ne!(HashPair::of(b"apple"), HashPair::of(b"banana"));
    }

    #[test]
    fn test_split64_stride_is_odd() {
        for key in [&b"a"[..], b"bb", b"ccc", b"dddd", b"eeeee"] {
            assert_eq!(HashPair::split64(key).h2 & 1, 1);
        }
    }

    #[test]
    fn test_index_stays_in_range() {
        let pair = HashPair::of(b"grape");
        for i in 0..64 {
            assert!(pair.index(i, 1000) < 1000);
        }
    }
}
