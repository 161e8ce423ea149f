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

use crate::bloom::BloomFilter;
use crate::error::Error;

const DEFAULT_GROWTH: u32 = 2;
const DEFAULT_TIGHTENING: f64 = 0.5;

/// A scalable Bloom filter that grows by appending tighter sub-filters.
///
/// Component filter `i` has capacity `c * g^i` and target false positive
/// rate `p * r^i`, where `g` is the growth factor and `r` the tightening
/// ratio. Insertions always go to the last (active) component; membership
/// is the OR across all components, so the monotonic no-false-negative
/// guarantee carries over.
///
/// # Examples
///
/// ```
/// # use proximate::bloom::ScalableBloomFilter;
/// let mut filter = ScalableBloomFilter::new_default(100, 0.01);
/// for i in 0..1000u32 {
///     filter.set(i.to_le_bytes());
/// }
/// assert!(filter.contains(42u32.to_le_bytes()));
/// assert!(filter.filter_count() > 1);
/// ```
#[derive(Debug, Clone)]
pub struct ScalableBloomFilter {
    filters: Vec<BloomFilter>,
    initial_capacity: u64,
    initial_fpp: f64,
    growth: u32,
    tightening: f64,
    /// Count of set calls, not of unique items
    items: u64,
}

impl ScalableBloomFilter {
    /// Creates a scalable filter with explicit growth parameters.
    ///
    /// The fallible version of this method is
    /// [`ScalableBloomFilter::try_new`].
    ///
    /// # Arguments
    ///
    /// - `capacity`: item capacity of the first component
    /// - `fpp`: target false positive probability of the first component
    /// - `growth`: capacity multiplier between components (>= 1)
    /// - `tightening`: false-positive multiplier between components, in (0, 1)
    ///
    /// # Panics
    ///
    /// Panics on a zero capacity or growth, or on ratios outside (0, 1).
    pub fn new(capacity: u64, fpp: f64, growth: u32, tightening: f64) -> Self {
        assert!(capacity > 0, "capacity must be greater than 0");
        assert!(
            fpp > 0.0 && fpp < 1.0,
            "fpp must be between 0.0 and 1.0 (exclusive)"
        );
        assert!(growth >= 1, "growth must be at least 1");
        assert!(
            tightening > 0.0 && tightening < 1.0,
            "tightening must be between 0.0 and 1.0 (exclusive)"
        );
        Self::make(capacity, fpp, growth, tightening)
    }

    /// Creates a scalable filter with the standard growth 2 and
    /// tightening 0.5.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0 or `fpp` is not in (0.0, 1.0).
    pub fn new_default(capacity: u64, fpp: f64) -> Self {
        Self::new(capacity, fpp, DEFAULT_GROWTH, DEFAULT_TIGHTENING)
    }

    /// Creates a scalable filter with explicit growth parameters.
    ///
    /// The panicking version of this method is
    /// [`ScalableBloomFilter::new`].
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidParameters`] on a zero capacity or growth, or
    /// on ratios outside (0, 1).
    ///
    /// [`ErrorKind::InvalidParameters`]: crate::error::ErrorKind::InvalidParameters
    pub fn try_new(capacity: u64, fpp: f64, growth: u32, tightening: f64) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::invalid_parameters("capacity must be greater than 0"));
        }
        if !(fpp > 0.0 && fpp < 1.0) {
            return Err(
                Error::invalid_parameters("fpp must be between 0.0 and 1.0 (exclusive)")
                    .with_context("fpp", fpp),
            );
        }
        if growth < 1 {
            return Err(Error::invalid_parameters("growth must be at least 1"));
        }
        if !(tightening > 0.0 && tightening < 1.0) {
            return Err(Error::invalid_parameters(
                "tightening must be between 0.0 and 1.0 (exclusive)",
            )
            .with_context("tightening", tightening));
        }
        Ok(Self::make(capacity, fpp, growth, tightening))
    }

    fn make(capacity: u64, fpp: f64, growth: u32, tightening: f64) -> Self {
        ScalableBloomFilter {
            filters: vec![BloomFilter::new(capacity, fpp)],
            initial_capacity: capacity,
            initial_fpp: fpp,
            growth,
            tightening,
            items: 0,
        }
    }

    /// Inserts an item, growing the filter first if the active component
    /// is at capacity.
    pub fn set(&mut self, item: impl AsRef<[u8]>) {
        let active = self.filters.len() - 1;
        if self.filters[active].estimated_size() >= self.component_capacity(active) {
            let next = self.filters.len();
            self.filters.push(BloomFilter::new(
                self.component_capacity(next),
                self.component_fpp(next),
            ));
        }
        // push above may have appended; insert into the current last
        let active = self.filters.len() - 1;
        self.filters[active].set(item);
        self.items += 1;
    }

    /// Tests whether an item is possibly in the set.
    ///
    /// True iff any component reports the item.
    pub fn contains(&self, item: impl AsRef<[u8]>) -> bool {
        let item = item.as_ref();
        self.filters.iter().any(|filter| filter.contains(item))
    }

    /// Returns the number of `set` calls made so far.
    pub fn estimated_size(&self) -> u64 {
        self.items
    }

    /// Returns the number of component filters.
    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Item capacity of component `i`: `c * g^i`, saturating.
    fn component_capacity(&self, i: usize) -> u64 {
        let scale = u64::from(self.growth).saturating_pow(i as u32);
        self.initial_capacity.saturating_mul(scale)
    }

    /// Target false positive rate of component `i`: `p * r^i`.
    fn component_fpp(&self, i: usize) -> f64 {
        self.initial_fpp * self.tightening.powi(i as i32)
    }
}
