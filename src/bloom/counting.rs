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

use crate::bits::Counter;
use crate::bits::CountingBitArray;
use crate::bloom::sketch::estimate_from_cells;
use crate::common::optimal_num_bits;
use crate::common::optimal_num_hashes;
use crate::error::Error;
use crate::hash::HashPair;

/// A counting Bloom filter: set membership with removal support.
///
/// Each position of the classic filter becomes a counter of width `C`, so
/// removing an item can decrement the same positions an insertion
/// incremented. The filter may still produce false positives; it never
/// produces a false negative for an item whose k counters are all
/// strictly positive.
///
/// # Examples
///
/// ```
/// # use proximate::bloom::CountingBloomFilter;
/// let mut filter = CountingBloomFilter::<u8>::new(100, 0.01);
/// filter.set("apple").unwrap();
/// assert!(filter.contains("apple"));
/// assert!(filter.remove("apple"));
/// assert!(!filter.contains("apple"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CountingBloomFilter<C: Counter> {
    /// Number of hash functions to use (k)
    num_hashes: u32,
    /// Counter array of m cells
    counters: CountingBitArray<C>,
}

impl<C: Counter> CountingBloomFilter<C> {
    /// Creates a filter with optimal parameters for a target accuracy.
    ///
    /// Parameter derivation matches [`BloomFilter::new`]; counters replace
    /// bits. The fallible version of this method is
    /// [`CountingBloomFilter::try_new`].
    ///
    /// # Panics
    ///
    /// Panics if `expected_items` is 0 or `fpp` is not in (0.0, 1.0).
    ///
    /// [`BloomFilter::new`]: crate::bloom::BloomFilter::new
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
    /// The panicking version of this method is
    /// [`CountingBloomFilter::new`].
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
        let num_cells = optimal_num_bits(expected_items, fpp);
        let num_hashes = optimal_num_hashes(num_cells, expected_items);
        CountingBloomFilter {
            num_hashes,
            counters: CountingBitArray::new(num_cells as usize),
        }
    }

    /// Inserts an item, incrementing its k derived counters.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::CounterOverflow`] if any derived counter is already at
    /// `C::MAX`. Increments applied before the failing one are rolled
    /// back, so a rejected insertion leaves the filter unchanged.
    ///
    /// [`ErrorKind::CounterOverflow`]: crate::error::ErrorKind::CounterOverflow
    pub fn set(&mut self, item: impl AsRef<[u8]>) -> Result<(), Error> {
        let indexes = self.indexes(item.as_ref());
        for (applied, &index) in indexes.iter().enumerate() {
            if !self.counters.increment_cell(index) {
                for &done in &indexes[..applied] {
                    self.counters.decrement_cell(done);
                }
                return Err(Error::counter_overflow(index as u64));
            }
        }
        Ok(())
    }

    /// Tests whether an item is possibly in the set.
    pub fn contains(&self, item: impl AsRef<[u8]>) -> bool {
        self.indexes(item.as_ref())
            .iter()
            .all(|&index| self.counters.cell_value(index) != C::ZERO)
    }

    /// Removes one occurrence of an item if it appears to be present.
    ///
    /// Returns `false` without modification when `contains` is negative;
    /// otherwise decrements the k derived counters and returns `true`.
    /// The decrements skip the underflow check: a positive `contains`
    /// already verified every counter.
    pub fn remove(&mut self, item: impl AsRef<[u8]>) -> bool {
        let indexes = self.indexes(item.as_ref());
        let present = indexes
            .iter()
            .all(|&index| self.counters.cell_value(index) != C::ZERO);
        if !present {
            return false;
        }
        for &index in &indexes {
            self.counters.decrement_cell(index);
        }
        true
    }

    /// Removes one occurrence of an item, verifying headroom first.
    ///
    /// Every derived counter is checked against its probe multiplicity
    /// before any is decremented, so a failure touches nothing.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::CounterUnderflow`] if any derived counter would go
    /// below zero.
    ///
    /// [`ErrorKind::CounterUnderflow`]: crate::error::ErrorKind::CounterUnderflow
    ///
    /// # Examples
    ///
    /// ```
    /// # use proximate::bloom::CountingBloomFilter;
    /// # use proximate::error::ErrorKind;
    /// let mut filter = CountingBloomFilter::<u8>::new(100, 0.01);
    /// filter.set("banana").unwrap();
    /// filter.remove_safe("banana").unwrap();
    /// assert_eq!(
    ///     filter.remove_safe("banana").unwrap_err().kind(),
    ///     ErrorKind::CounterUnderflow,
    /// );
    /// ```
    pub fn remove_safe(&mut self, item: impl AsRef<[u8]>) -> Result<(), Error> {
        let mut indexes = self.indexes(item.as_ref());
        // Double hashing may derive the same cell more than once; each
        // cell must cover its full multiplicity.
        indexes.sort_unstable();
        let mut run = 0;
        while run < indexes.len() {
            let index = indexes[run];
            let mut end = run + 1;
            while end < indexes.len() && indexes[end] == index {
                end += 1;
            }
            if self.counters.cell_value(index).to_u64() < (end - run) as u64 {
                return Err(Error::counter_underflow(index as u64));
            }
            run = end;
        }
        for &index in &indexes {
            self.counters.decrement_cell(index);
        }
        Ok(())
    }

    /// Estimates the number of distinct items currently represented.
    ///
    /// Uses the fill-ratio formula of the plain filter with the count of
    /// non-zero cells standing in for the popcount.
    pub fn estimated_size(&self) -> u64 {
        estimate_from_cells(
            self.counters.count_nonzero(),
            self.counters.len() as u64,
            self.num_hashes,
        )
    }

    /// Returns the number of counter cells (m).
    pub fn capacity_cells(&self) -> u64 {
        self.counters.len() as u64
    }

    /// Returns the number of hash functions used (k).
    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// The k cell indexes of an item by double hashing.
    fn indexes(&self, item: &[u8]) -> Vec<usize> {
        let pair = HashPair::of(item);
        let m = self.counters.len() as u64;
        (0..self.num_hashes)
            .map(|i| pair.index(i, m) as usize)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::U4;
    use crate::error::ErrorKind;

    #[test]
    fn test_set_remove_cycle() {
        let mut filter = CountingBloomFilter::<u8>::new(100, 0.01);
        filter.set("apple").unwrap();
        filter.set("apple").unwrap();
        assert!(filter.contains("apple"));

        assert!(filter.remove("apple"));
        assert!(filter.contains("apple"));
        assert!(filter.remove("apple"));
        assert!(!filter.contains("apple"));
    }

    #[test]
    fn test_remove_missing_leaves_filter_untouched() {
        let mut filter = CountingBloomFilter::<u8>::new(100, 0.01);
        filter.set("apple").unwrap();
        assert!(!filter.remove("zebra"));
        assert!(filter.contains("apple"));
    }

    #[test]
    fn test_remove_safe_underflow() {
        let mut filter = CountingBloomFilter::<u8>::new(100, 0.01);
        let err = filter.remove_safe("zebra").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CounterUnderflow);
    }

    #[test]
    fn test_overflow_rolls_back() {
        let mut filter = CountingBloomFilter::<U4>::new(10, 0.5);
        for _ in 0..15 {
            filter.set("apple").unwrap();
        }
        let err = filter.set("apple").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CounterOverflow);
        // the rejected insert left the counters consistent
        for _ in 0..15 {
            assert!(filter.remove("apple"));
        }
        assert!(!filter.contains("apple"));
    }

    #[test]
    fn test_estimated_size() {
        let mut filter = CountingBloomFilter::<u16>::new(1000, 0.01);
        for i in 0..300u32 {
            filter.set(i.to_le_bytes()).unwrap();
        }
        let estimate = filter.estimated_size();
        assert!((240..=360).contains(&estimate), "estimate {estimate}");
    }
}
