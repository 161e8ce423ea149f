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

use crate::bits::BitArray;
use crate::common::optimal_num_bits;
use crate::common::optimal_num_hashes;
use crate::error::Error;
use crate::hash::HashPair;

/// A Bloom filter for probabilistic set membership testing.
///
/// Provides fast membership queries with:
/// - No false negatives (inserted items always return `true`)
/// - Tunable false positive rate
/// - Constant space usage
///
/// The filter is monotonic: [`set`](Self::set) only sets bits, and bits
/// are never cleared short of a full [`reset`](Self::reset).
#[derive(Debug, Clone, PartialEq)]
pub struct BloomFilter {
    /// Number of hash functions to use (k)
    num_hashes: u32,
    /// Bit array of m bits
    bits: BitArray,
}

impl BloomFilter {
    /// Creates a filter with optimal parameters for a target accuracy.
    ///
    /// The fallible version of this method is [`BloomFilter::try_new`].
    ///
    /// # Arguments
    ///
    /// - `expected_items`: Maximum expected number of distinct items
    /// - `fpp`: Target false positive probability (e.g., 0.01 for 1%)
    ///
    /// # Panics
    ///
    /// Panics if `expected_items` is 0 or `fpp` is not in (0.0, 1.0).
    ///
    /// # Examples
    ///
    /// ```
    /// # use proximate::bloom::BloomFilter;
    /// let filter = BloomFilter::new(10_000, 0.01);
    /// assert_eq!(filter.num_hashes(), 7);
    /// ```
    pub fn new(expected_items: u64, fpp: f64) -> Self {
        assert!(expected_items > 0, "expected_items must be greater than 0");
        assert!(
            fpp > 0.0 && fpp < 1.0,
            "fpp must be between 0.0 and 1.0 (exclusive)"
        );
        Self::make(expected_items, fpp)
    }

    /// Creates a filter with optimal parameters for a target accuracy.
    ///
    /// The panicking version of this method is [`BloomFilter::new`].
    ///
    /// # Errors
    ///
    /// If `expected_items` is 0 or `fpp` is outside (0.0, 1.0), returns
    /// [`ErrorKind::InvalidParameters`].
    ///
    /// [`ErrorKind::InvalidParameters`]: crate::error::ErrorKind::InvalidParameters
    pub fn try_new(expected_items: u64, fpp: f64) -> Result<Self, Error> {
        if expected_items == 0 {
            return Err(Error::invalid_parameters(
                "expected_items must be greater than 0",
            ));
        }
        if !(fpp > 0.0 && fpp < 1.0) {
            return Err(
                Error::invalid_parameters("fpp must be between 0.0 and 1.0 (exclusive)")
                    .with_context("fpp", fpp),
            );
        }
        Ok(Self::make(expected_items, fpp))
    }

    fn make(expected_items: u64, fpp: f64) -> Self {
        let num_bits = optimal_num_bits(expected_items, fpp);
        let num_hashes = optimal_num_hashes(num_bits, expected_items);
        BloomFilter {
            num_hashes,
            bits: BitArray::new(num_bits),
        }
    }

    /// Inserts an item into the filter.
    ///
    /// After insertion, `contains(item)` will always return `true`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use proximate::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(100, 0.01);
    /// filter.set("apple");
    /// assert!(filter.contains("apple"));
    /// ```
    pub fn set(&mut self, item: impl AsRef<[u8]>) {
        let pair = HashPair::of(item.as_ref());
        self.set_bits(pair);
    }

    /// Tests whether an item is possibly in the set.
    ///
    /// Returns:
    /// - `true`: Item was **possibly** inserted (or false positive)
    /// - `false`: Item was **definitely not** inserted
    pub fn contains(&self, item: impl AsRef<[u8]>) -> bool {
        let pair = HashPair::of(item.as_ref());
        self.check_bits(pair)
    }

    /// Tests and inserts an item in a single operation.
    ///
    /// Returns whether the item was possibly already in the set before
    /// insertion. This is more efficient than calling `contains()` then
    /// `set()` separately.
    ///
    /// # Examples
    ///
    /// ```
    /// # use proximate::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(100, 0.01);
    /// assert!(!filter.contains_and_set("apple"));
    /// assert!(filter.contains_and_set("apple"));
    /// ```
    pub fn contains_and_set(&mut self, item: impl AsRef<[u8]>) -> bool {
        let pair = HashPair::of(item.as_ref());
        let was_present = self.check_bits(pair);
        self.set_bits(pair);
        was_present
    }

    /// Estimates the number of distinct items inserted so far.
    ///
    /// Uses the standard fill-ratio estimate `-(m/k) * ln(1 - X/m)` where
    /// X is the number of set bits, clamped to 0 once every bit is set
    /// (the formula diverges there and carries no information).
    pub fn estimated_size(&self) -> u64 {
        estimate_from_cells(self.bits.popcount(), self.bits.len(), self.num_hashes)
    }

    /// Merges another filter into this one via bitwise OR (union).
    ///
    /// After merging, this filter will recognize items from either filter
    /// (plus any false positives from either).
    ///
    /// # Panics
    ///
    /// Panics if the filters are not compatible (different size or hash
    /// count). Use [`is_compatible()`](Self::is_compatible) to check first.
    ///
    /// # Examples
    ///
    /// ```
    /// # use proximate::bloom::BloomFilter;
    /// let mut f1 = BloomFilter::new(100, 0.01);
    /// let mut f2 = BloomFilter::new(100, 0.01);
    /// f1.set("a");
    /// f2.set("b");
    ///
    /// f1.union(&f2);
    /// assert!(f1.contains("a"));
    /// assert!(f1.contains("b"));
    /// ```
    pub fn union(&mut self, other: &BloomFilter) {
        assert!(
            self.is_compatible(other),
            "Cannot union incompatible Bloom filters"
        );
        self.bits.union_raw(&other.bits);
    }

    /// Checks if two filters are compatible for merging.
    ///
    /// Filters are compatible if they have the same capacity and the same
    /// number of hash functions.
    pub fn is_compatible(&self, other: &BloomFilter) -> bool {
        self.bits.len() == other.bits.len() && self.num_hashes == other.num_hashes
    }

    /// Resets the filter to its initial empty state.
    ///
    /// Clears all bits while preserving capacity and configuration.
    pub fn reset(&mut self) {
        self.bits.clear();
    }

    /// Returns whether the filter is empty (no items inserted).
    pub fn is_empty(&self) -> bool {
        self.bits.popcount() == 0
    }

    /// Returns the total number of bits in the filter (m).
    pub fn capacity_bits(&self) -> u64 {
        self.bits.len()
    }

    /// Returns the number of hash functions used (k).
    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// Checks if all k bits are set for the given hash pair.
    fn check_bits(&self, pair: HashPair) -> bool {
        let m = self.bits.len();
        for i in 0..self.num_hashes {
            if !self.bits.get_raw(pair.index(i, m)) {
                return false;
            }
        }
        true
    }

    /// Sets all k bits for the given hash pair.
    fn set_bits(&mut self, pair: HashPair) {
        let m = self.bits.len();
        for i in 0..self.num_hashes {
            self.bits.set_raw(pair.index(i, m));
        }
    }
}

/// Fill-ratio size estimate shared with the counting variant.
///
/// Clamps to 0 when every cell is occupied; the ln argument hits zero
/// there and the formula stops carrying information.
pub(super) fn estimate_from_cells(occupied: u64, num_cells: u64, num_hashes: u32) -> u64 {
    if occupied == 0 {
        return 0;
    }
    let m = num_cells as f64;
    let k = f64::from(num_hashes);
    let fill = 1.0 - (occupied as f64 / m);
    if fill <= 0.0 {
        return 0;
    }
    (-(m / k) * fill.ln()).floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parameter_derivation() {
        let filter = BloomFilter::new(1000, 0.01);
        assert_eq!(filter.capacity_bits(), 9586);
        assert_eq!(filter.num_hashes(), 7);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_set_and_contains() {
        let mut filter = BloomFilter::new(100, 0.01);
        assert!(!filter.contains("apple"));
        filter.set("apple");
        assert!(filter.contains("apple"));
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_estimated_size_tracks_inserts() {
        let mut filter = BloomFilter::new(1000, 0.01);
        for i in 0..500u32 {
            filter.set(i.to_le_bytes());
        }
        let estimate = filter.estimated_size();
        assert!((400..=600).contains(&estimate), "estimate {estimate}");
    }

    #[test]
    fn test_reset() {
        let mut filter = BloomFilter::new(100, 0.01);
        filter.set("test");
        filter.reset();
        assert!(filter.is_empty());
        assert!(!filter.contains("test"));
        assert_eq!(filter.estimated_size(), 0);
    }

    #[test]
    fn test_try_new_rejects_bad_parameters() {
        assert_eq!(
            BloomFilter::try_new(0, 0.01).unwrap_err().kind(),
            ErrorKind::InvalidParameters
        );
        assert_eq!(
            BloomFilter::try_new(100, 0.0).unwrap_err().kind(),
            ErrorKind::InvalidParameters
        );
        assert_eq!(
            BloomFilter::try_new(100, 1.0).unwrap_err().kind(),
            ErrorKind::InvalidParameters
        );
    }

    #[test]
    #[should_panic(expected = "Cannot union incompatible Bloom filters")]
    fn test_union_incompatible() {
        let mut f1 = BloomFilter::new(100, 0.01);
        let f2 = BloomFilter::new(200, 0.01);
        f1.union(&f2);
    }
}
