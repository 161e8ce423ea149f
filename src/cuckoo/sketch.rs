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

use std::fmt;
use std::mem;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::error::Error;
use crate::hash::murmur3_32;
use crate::hash::xxhash64;
use crate::hash::DEFAULT_SKETCH_SEED;

/// Eviction attempts before an insertion gives up with `FilterFull`.
const MAX_KICKS: u32 = 500;

/// A short non-zero tag stored in place of a key.
///
/// Zero is reserved as the empty-slot marker; the coercion from a hash
/// therefore maps onto `[1, MAX]`.
pub trait Fingerprint: Copy + Default + PartialEq + fmt::Debug {
    /// Coerces a hash to a non-zero fingerprint.
    fn from_hash(hash: u64) -> Self;

    /// Widens the fingerprint for re-hashing.
    fn to_u64(self) -> u64;

    /// Returns true for the empty-slot marker.
    fn is_empty(self) -> bool;
}

macro_rules! impl_fingerprint {
    ($($ty:ty),*) => {
        $(
            impl Fingerprint for $ty {
                #[inline]
                fn from_hash(hash: u64) -> Self {
                    // Uses least significant bits and ensures it is never 0
                    (hash % u64::from(<$ty>::MAX) + 1) as $ty
                }

                #[inline]
                fn to_u64(self) -> u64 {
                    u64::from(self)
                }

                #[inline]
                fn is_empty(self) -> bool {
                    self == 0
                }
            }
        )*
    };
}

impl_fingerprint!(u8, u16, u32);

/// Approximate set-membership filter with support for deletion.
///
/// `F` is the fingerprint width (u8, u16 or u32; wider fingerprints give
/// fewer false positives) and `B` the number of slots per bucket. Each
/// fingerprint may live in one of two candidate buckets related by
/// `b2 = b1 XOR (hash(fingerprint) mod buckets)`, a mapping that is its
/// own inverse.
///
/// # Examples
///
/// ```
/// # use proximate::cuckoo::CuckooFilter;
/// let mut filter = CuckooFilter::<u16, 4>::new(1000);
/// filter.set("alice").unwrap();
/// assert!(filter.contains("alice"));
/// assert!(filter.remove("alice"));
/// assert!(!filter.contains("alice"));
/// ```
#[derive(Debug, Clone)]
pub struct CuckooFilter<F: Fingerprint, const B: usize> {
    buckets: Vec<[F; B]>,
    len: u64,
    rng: StdRng,
}

impl<F: Fingerprint, const B: usize> CuckooFilter<F, B> {
    /// Creates a filter sized for `capacity` items.
    ///
    /// The bucket count is the next power of two of `capacity / B`.
    /// Eviction randomness comes from process entropy; use
    /// [`with_seed`](Self::with_seed) for reproducible runs.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: u64) -> Self {
        Self::with_rng(capacity, StdRng::from_entropy())
    }

    /// Creates a filter whose eviction PRNG is seeded deterministically.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn with_seed(capacity: u64, seed: u64) -> Self {
        Self::with_rng(capacity, StdRng::seed_from_u64(seed))
    }

    fn with_rng(capacity: u64, rng: StdRng) -> Self {
        assert!(capacity > 0, "capacity must be greater than 0");
        let buckets = (capacity.div_ceil(B as u64)).next_power_of_two() as usize;
        CuckooFilter {
            buckets: vec![[F::default(); B]; buckets],
            len: 0,
            rng,
        }
    }

    /// Inserts an item.
    ///
    /// Both candidate buckets are tried first; if neither has a free slot
    /// the filter enters cuckoo eviction, displacing random fingerprints
    /// until a hole opens up.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::FilterFull`] after 500 displacements without finding a
    /// free slot.
    ///
    /// [`ErrorKind::FilterFull`]: crate::error::ErrorKind::FilterFull
    pub fn set(&mut self, item: impl AsRef<[u8]>) -> Result<(), Error> {
        let (mut fingerprint, first) = self.fingerprint_and_bucket(item.as_ref());
        let second = self.alt_bucket(first, fingerprint);

        if self.try_place(first, fingerprint) || self.try_place(second, fingerprint) {
            self.len += 1;
            return Ok(());
        }

        let mut bucket = first;
        for _ in 0..MAX_KICKS {
            let slot = self.rng.gen_range(0..B);
            mem::swap(&mut fingerprint, &mut self.buckets[bucket][slot]);
            bucket = self.alt_bucket(bucket, fingerprint);
            if self.try_place(bucket, fingerprint) {
                self.len += 1;
                return Ok(());
            }
        }
        Err(Error::filter_full("cuckoo eviction exhausted max kicks")
            .with_context("max_kicks", MAX_KICKS))
    }

    /// Tests whether an item is possibly in the set.
    pub fn contains(&self, item: impl AsRef<[u8]>) -> bool {
        let (fingerprint, first) = self.fingerprint_and_bucket(item.as_ref());
        let second = self.alt_bucket(first, fingerprint);
        self.buckets[first].contains(&fingerprint) || self.buckets[second].contains(&fingerprint)
    }

    /// Removes one occurrence of an item.
    ///
    /// Clears the first matching slot across the two candidate buckets and
    /// returns whether a removal occurred. Removing more copies than were
    /// inserted can introduce false negatives for colliding keys; callers
    /// must not do that.
    pub fn remove(&mut self, item: impl AsRef<[u8]>) -> bool {
        let (fingerprint, first) = self.fingerprint_and_bucket(item.as_ref());
        let second = self.alt_bucket(first, fingerprint);
        for bucket in [first, second] {
            if let Some(slot) = self.buckets[bucket]
                .iter()
                .position(|&fp| fp == fingerprint)
            {
                self.buckets[bucket][slot] = F::default();
                self.len -= 1;
                return true;
            }
        }
        false
    }

    /// Returns the exact count of occupied slots.
    pub fn estimated_size(&self) -> u64 {
        self.len
    }

    /// Returns the number of buckets (a power of two).
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Places the fingerprint in the first empty slot of `bucket`.
    fn try_place(&mut self, bucket: usize, fingerprint: F) -> bool {
        for slot in &mut self.buckets[bucket] {
            if slot.is_empty() {
                *slot = fingerprint;
                return true;
            }
        }
        false
    }

    /// Derives the fingerprint and primary candidate bucket of an item.
    fn fingerprint_and_bucket(&self, item: &[u8]) -> (F, usize) {
        let fingerprint = F::from_hash(u64::from(murmur3_32(item, DEFAULT_SKETCH_SEED)));
        let hash = xxhash64(item, u64::from(DEFAULT_SKETCH_SEED));
        let bucket = (hash as usize) & (self.buckets.len() - 1);
        (fingerprint, bucket)
    }

    /// The other candidate bucket: `b XOR (hash(fp) mod buckets)`.
    ///
    /// Power-of-two bucket counts keep the XOR inside range, and applying
    /// the mapping twice returns the original bucket.
    fn alt_bucket(&self, bucket: usize, fingerprint: F) -> usize {
        let tag_hash = murmur3_32(&fingerprint.to_u64().to_le_bytes(), DEFAULT_SKETCH_SEED);
        bucket ^ ((tag_hash as usize) & (self.buckets.len() - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_set_contains_remove() {
        let mut filter = CuckooFilter::<u16, 4>::with_seed(1000, 7);
        filter.set("apple").unwrap();
        filter.set("banana").unwrap();
        assert!(filter.contains("apple"));
        assert!(filter.contains("banana"));
        assert!(!filter.contains("grape"));

        assert!(filter.remove("banana"));
        assert!(!filter.contains("banana"));
        assert!(!filter.remove("banana"));
        assert_eq!(filter.estimated_size(), 1);
    }

    #[test]
    fn test_alt_bucket_is_self_inverse() {
        let filter = CuckooFilter::<u16, 4>::with_seed(1000, 7);
        for hash in [1u64, 17, 250, 99_999] {
            let fingerprint = u16::from_hash(hash);
            let b1 = (hash as usize) & (filter.num_buckets() - 1);
            let b2 = filter.alt_bucket(b1, fingerprint);
            assert_eq!(filter.alt_bucket(b2, fingerprint), b1);
        }
    }

    #[test]
    fn test_fingerprints_are_nonzero() {
        for hash in 0..10_000u64 {
            assert!(!u8::from_hash(hash).is_empty());
            assert!(!u16::from_hash(hash).is_empty());
            assert!(!u32::from_hash(hash).is_empty());
        }
    }

    #[test]
    fn test_filter_full_after_max_kicks() {
        // 2 buckets of 2 slots hold at most 4 fingerprints
        let mut filter = CuckooFilter::<u8, 2>::with_seed(4, 7);
        let mut full_error = None;
        for i in 0..100u32 {
            if let Err(err) = filter.set(i.to_le_bytes()) {
                full_error = Some(err);
                break;
            }
        }
        let err = full_error.expect("a 4 slot filter must fill up");
        assert_eq!(err.kind(), ErrorKind::FilterFull);
    }

    #[test]
    fn test_eviction_keeps_members_queryable() {
        let mut filter = CuckooFilter::<u16, 4>::with_seed(64, 7);
        let mut inserted = Vec::new();
        for i in 0..48u32 {
            if filter.set(i.to_le_bytes()).is_ok() {
                inserted.push(i);
            } else {
                break;
            }
        }
        assert!(inserted.len() > 8);
        for i in inserted {
            assert!(filter.contains(i.to_le_bytes()));
        }
    }
}
