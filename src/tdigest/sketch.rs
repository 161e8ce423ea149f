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

use std::cmp::Ordering;
use std::mem;

use crate::error::Error;
use crate::error::ErrorKind;

/// The default compression if one is not specified.
const DEFAULT_COMPRESSION: f64 = 100.0;
/// Centroid count that triggers an automatic compression pass.
const MAX_DISCRETE: usize = 25;

const MIN_COMPRESSION: f64 = 10.0;
const MAX_COMPRESSION: f64 = 1000.0;

/// T-Digest sketch for estimating quantiles and ranks.
///
/// See the [module level documentation](super) for more.
///
/// # Examples
///
/// ```
/// # use proximate::tdigest::TDigest;
/// let mut digest = TDigest::new_default();
/// for value in 1..=100 {
///     digest.add(value as f64);
/// }
/// let median = digest.quantile(0.5).unwrap();
/// assert!((45.0..=55.0).contains(&median));
/// ```
#[derive(Debug, Clone)]
pub struct TDigest {
    compression: f64,

    min: f64,
    max: f64,

    centroids: Vec<Centroid>,
    total_weight: u64,
}

impl Default for TDigest {
    fn default() -> Self {
        TDigest::new_default()
    }
}

impl TDigest {
    /// Creates a digest with the given compression (delta).
    ///
    /// Larger compression keeps more centroids and gives tighter
    /// quantiles. The fallible version of this method is
    /// [`TDigest::try_new`].
    ///
    /// # Panics
    ///
    /// Panics if `compression` is outside [10, 1000].
    ///
    /// # Examples
    ///
    /// ```
    /// # use proximate::tdigest::TDigest;
    /// let digest = TDigest::new(200.0);
    /// assert_eq!(digest.compression(), 200.0);
    /// ```
    pub fn new(compression: f64) -> Self {
        assert!(
            (MIN_COMPRESSION..=MAX_COMPRESSION).contains(&compression),
            "compression must be in [{MIN_COMPRESSION}, {MAX_COMPRESSION}]"
        );
        Self::make(compression)
    }

    /// Creates a digest with the default compression of 100.
    pub fn new_default() -> Self {
        Self::make(DEFAULT_COMPRESSION)
    }

    /// Creates a digest with the given compression (delta).
    ///
    /// The panicking version of this method is [`TDigest::new`].
    ///
    /// # Errors
    ///
    /// If `compression` is outside [10, 1000], returns
    /// [`ErrorKind::InvalidCompression`].
    pub fn try_new(compression: f64) -> Result<Self, Error> {
        if !(MIN_COMPRESSION..=MAX_COMPRESSION).contains(&compression) {
            return Err(Error::new(
                ErrorKind::InvalidCompression,
                format!("compression must be in [{MIN_COMPRESSION}, {MAX_COMPRESSION}]"),
            )
            .with_context("compression", compression));
        }
        Ok(Self::make(compression))
    }

    fn make(compression: f64) -> Self {
        TDigest {
            compression,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            centroids: vec![],
            total_weight: 0,
        }
    }

    /// Updates the digest with the given value at weight 1.
    ///
    /// `NaN` and infinite values are ignored.
    pub fn add(&mut self, value: f64) {
        self.add_weighted(value, 1);
    }

    /// Updates the digest with the given value and weight.
    ///
    /// `NaN` and infinite values are ignored, as are zero weights.
    pub fn add_weighted(&mut self, value: f64, weight: u64) {
        if value.is_nan() || value.is_infinite() || weight == 0 {
            return;
        }

        self.centroids.push(Centroid {
            mean: value,
            weight,
        });
        self.total_weight += weight;
        self.min = self.min.min(value);
        self.max = self.max.max(value);

        if self.centroids.len() > MAX_DISCRETE {
            self.compress();
        }
    }

    /// Merges adjacent centroids that the size rule allows.
    ///
    /// Two neighbours combine when their means are closer than
    /// `100 / compression` and the combined weight stays below
    /// `total * 2 / compression`. Runs automatically as values
    /// accumulate; calling it explicitly is only useful before
    /// inspecting memory use.
    pub fn compress(&mut self) {
        if self.centroids.len() <= 1 {
            return;
        }
        self.centroids.sort_by(centroid_cmp);

        let mean_gap_limit = 100.0 / self.compression;
        let weight_limit = self.total_weight as f64 * 2.0 / self.compression;

        let mut merged: Vec<Centroid> = Vec::with_capacity(self.centroids.len());
        for centroid in mem::take(&mut self.centroids) {
            if let Some(last) = merged.last_mut() {
                let combined_weight = (last.weight + centroid.weight) as f64;
                if centroid.mean - last.mean < mean_gap_limit && combined_weight < weight_limit {
                    last.add(centroid);
                    continue;
                }
            }
            merged.push(centroid);
        }
        self.centroids = merged;
    }

    /// Compute the approximate value at the given quantile.
    ///
    /// Walks the sorted centroids treating half of each centroid's weight
    /// as sitting on either side of its mean, interpolating linearly in
    /// the gap the target weight falls into. Boundary quantiles map to
    /// the first and last centroid means.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidParameters`] if `q` is outside [0, 1];
    /// [`ErrorKind::EmptyDigest`] if no value has been added.
    ///
    /// # Examples
    ///
    /// ```
    /// # use proximate::tdigest::TDigest;
    /// let mut digest = TDigest::new(100.0);
    /// digest.add(1.0);
    /// digest.add(2.0);
    /// digest.add(3.0);
    /// let q = digest.quantile(1.0).unwrap();
    /// assert_eq!(q, 3.0);
    /// ```
    pub fn quantile(&mut self, q: f64) -> Result<f64, Error> {
        if !(0.0..=1.0).contains(&q) {
            return Err(
                Error::invalid_parameters("quantile must be in [0.0, 1.0]").with_context("q", q)
            );
        }
        if self.centroids.is_empty() {
            return Err(Error::empty_digest());
        }
        self.compress();

        let centroids = &self.centroids;
        let num = centroids.len();
        let total = self.total_weight as f64;
        let target = q * total;

        let first = &centroids[0];
        let last = &centroids[num - 1];
        if target <= first.weight_f64() / 2.0 {
            return Ok(first.mean);
        }
        if target >= total - last.weight_f64() / 2.0 {
            return Ok(last.mean);
        }

        // between the half-weight positions of two adjacent centroids
        let mut cumulative = 0.0;
        for i in 0..num - 1 {
            let here = cumulative + centroids[i].weight_f64() / 2.0;
            let next = cumulative + centroids[i].weight_f64() + centroids[i + 1].weight_f64() / 2.0;
            if target <= next {
                let fraction = if next > here {
                    (target - here) / (next - here)
                } else {
                    0.0
                };
                return Ok(
                    centroids[i].mean + fraction * (centroids[i + 1].mean - centroids[i].mean)
                );
            }
            cumulative += centroids[i].weight_f64();
        }
        Ok(last.mean)
    }

    /// Compute the approximate fraction of values at or below `value`.
    ///
    /// The symmetric counterpart of [`quantile`](Self::quantile).
    ///
    /// # Errors
    ///
    /// [`ErrorKind::EmptyDigest`] if no value has been added.
    pub fn cdf(&mut self, value: f64) -> Result<f64, Error> {
        if self.centroids.is_empty() {
            return Err(Error::empty_digest());
        }
        self.compress();

        let centroids = &self.centroids;
        let num = centroids.len();
        let total = self.total_weight as f64;

        if value < centroids[0].mean {
            return Ok(0.0);
        }
        if value > centroids[num - 1].mean {
            return Ok(1.0);
        }
        if num == 1 {
            // value == the single mean
            return Ok(0.5);
        }
        if value == centroids[num - 1].mean {
            return Ok((total - centroids[num - 1].weight_f64() / 2.0) / total);
        }

        let mut cumulative = 0.0;
        for i in 0..num - 1 {
            if value < centroids[i + 1].mean {
                let base = cumulative + centroids[i].weight_f64() / 2.0;
                let gap_weight =
                    (centroids[i].weight_f64() + centroids[i + 1].weight_f64()) / 2.0;
                let fraction =
                    (value - centroids[i].mean) / (centroids[i + 1].mean - centroids[i].mean);
                return Ok((base + fraction * gap_weight) / total);
            }
            cumulative += centroids[i].weight_f64();
        }
        Ok(1.0)
    }

    /// Merges another digest into this one.
    ///
    /// Every centroid of `other` is re-added as a weighted sample, so the
    /// result obeys the same compression rule as direct updates.
    ///
    /// # Examples
    ///
    /// ```
    /// # use proximate::tdigest::TDigest;
    /// let mut left = TDigest::new_default();
    /// let mut right = TDigest::new_default();
    /// left.add(1.0);
    /// right.add(2.0);
    /// left.merge(&right);
    /// assert_eq!(left.size(), 2);
    /// ```
    pub fn merge(&mut self, other: &TDigest) {
        for centroid in &other.centroids {
            self.add_weighted(centroid.mean, centroid.weight);
        }
    }

    /// Returns the total weight added so far.
    pub fn size(&self) -> u64 {
        self.total_weight
    }

    /// Returns true if the digest has not seen any data.
    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    /// Returns the compression (delta) this digest was configured with.
    pub fn compression(&self) -> f64 {
        self.compression
    }

    /// Returns the minimum value seen; `None` if the digest is empty.
    pub fn min_value(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.min)
        }
    }

    /// Returns the maximum value seen; `None` if the digest is empty.
    pub fn max_value(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.max)
        }
    }

    /// Returns the number of centroids currently held.
    pub fn num_centroids(&self) -> usize {
        self.centroids.len()
    }
}

fn centroid_cmp(a: &Centroid, b: &Centroid) -> Ordering {
    match a.mean.partial_cmp(&b.mean) {
        Some(order) => order,
        None => unreachable!("NaN values should never be present in centroids"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Centroid {
    mean: f64,
    weight: u64,
}

impl Centroid {
    /// Folds another centroid in, moving the mean by weight ratio.
    fn add(&mut self, other: Centroid) {
        let total_weight = self.weight + other.weight;
        let ratio_other = other.weight_f64() / total_weight as f64;
        let delta = other.mean - self.mean;
        self.mean = delta.mul_add(ratio_other, self.mean);
        self.weight = total_weight;

        debug_assert!(
            self.mean.is_finite(),
            "Centroid's mean must be finite; self: {}, other: {}",
            self.mean,
            other.mean
        );
    }

    fn weight_f64(&self) -> f64 {
        self.weight as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_empty() {
        let mut digest = TDigest::new_default();
        assert!(digest.is_empty());
        assert_eq!(digest.size(), 0);
        assert_eq!(digest.min_value(), None);
        assert_eq!(digest.max_value(), None);
        assert_eq!(digest.quantile(0.5).unwrap_err().kind(), ErrorKind::EmptyDigest);
        assert_eq!(digest.cdf(1.0).unwrap_err().kind(), ErrorKind::EmptyDigest);
    }

    #[test]
    fn test_one_value() {
        let mut digest = TDigest::new(100.0);
        digest.add(1.0);
        assert_eq!(digest.size(), 1);
        assert_eq!(digest.min_value(), Some(1.0));
        assert_eq!(digest.max_value(), Some(1.0));
        assert_eq!(digest.quantile(0.0).unwrap(), 1.0);
        assert_eq!(digest.quantile(0.5).unwrap(), 1.0);
        assert_eq!(digest.quantile(1.0).unwrap(), 1.0);
        assert_eq!(digest.cdf(0.99).unwrap(), 0.0);
        assert_eq!(digest.cdf(1.0).unwrap(), 0.5);
        assert_eq!(digest.cdf(1.01).unwrap(), 1.0);
    }

    #[test]
    fn test_non_finite_values_ignored() {
        let mut digest = TDigest::new_default();
        digest.add(f64::NAN);
        digest.add(f64::INFINITY);
        digest.add(f64::NEG_INFINITY);
        digest.add_weighted(1.0, 0);
        assert!(digest.is_empty());
    }

    #[test]
    fn test_quantiles_are_monotone() {
        let mut digest = TDigest::new(50.0);
        for i in 0..500 {
            digest.add((i as f64) * 0.01);
        }
        let q0 = digest.quantile(0.0).unwrap();
        let q1 = digest.quantile(1.0).unwrap();
        let mut previous = q0;
        for step in 1..=20 {
            let q = digest.quantile(step as f64 / 20.0).unwrap();
            assert!(q >= previous);
            previous = q;
        }
        assert!(q1 >= previous || (q1 - previous).abs() < 1e-12);
    }

    #[test]
    fn test_compression_bounds_centroids() {
        let mut digest = TDigest::new(10.0);
        for i in 0..10_000 {
            digest.add((i % 100) as f64);
        }
        digest.compress();
        assert!(digest.num_centroids() < 500);
        assert_eq!(digest.size(), 10_000);
    }

    #[test]
    fn test_invalid_arguments() {
        assert_eq!(
            TDigest::try_new(5.0).unwrap_err().kind(),
            ErrorKind::InvalidCompression
        );
        assert_eq!(
            TDigest::try_new(2000.0).unwrap_err().kind(),
            ErrorKind::InvalidCompression
        );
        let mut digest = TDigest::new_default();
        digest.add(1.0);
        assert_eq!(
            digest.quantile(1.5).unwrap_err().kind(),
            ErrorKind::InvalidParameters
        );
        assert_eq!(
            digest.quantile(-0.1).unwrap_err().kind(),
            ErrorKind::InvalidParameters
        );
    }

    #[test]
    fn test_merge_combines_streams() {
        let mut left = TDigest::new(100.0);
        let mut right = TDigest::new(100.0);
        for i in 1..=50 {
            left.add(i as f64);
        }
        for i in 51..=100 {
            right.add(i as f64);
        }
        left.merge(&right);
        assert_eq!(left.size(), 100);
        let median = left.quantile(0.5).unwrap();
        assert!((45.0..=55.0).contains(&median), "median {median}");
    }
}
