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

use std::mem;

use crate::error::Error;
use crate::error::ErrorKind;

const MIN_COMPRESSION: u64 = 1;
const MAX_COMPRESSION: u64 = 1000;

/// Q-Digest sketch for quantiles over a bounded integer universe.
///
/// See the [module level documentation](super) for more.
///
/// # Examples
///
/// ```
/// # use proximate::qdigest::QDigest;
/// let mut digest = QDigest::new(50, 1024);
/// for value in 1..=100u64 {
///     digest.add(value).unwrap();
/// }
/// let median = digest.quantile(0.5).unwrap();
/// assert!((40.0..=60.0).contains(&median));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QDigest {
    compression_factor: u64,
    universe: u64,
    /// Disjoint range nodes, kept sorted by range start
    nodes: Vec<Node>,
    total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Node {
    left: u64,
    right: u64,
    count: u64,
}

impl QDigest {
    /// Creates a digest over the universe `[0, universe)`.
    ///
    /// The fallible version of this method is [`QDigest::try_new`].
    ///
    /// # Panics
    ///
    /// Panics if `compression_factor` is outside [1, 1000] or `universe`
    /// is not a positive power of two.
    ///
    /// # Examples
    ///
    /// ```
    /// # use proximate::qdigest::QDigest;
    /// let digest = QDigest::new(50, 1024);
    /// assert_eq!(digest.universe(), 1024);
    /// ```
    pub fn new(compression_factor: u64, universe: u64) -> Self {
        assert!(
            (MIN_COMPRESSION..=MAX_COMPRESSION).contains(&compression_factor),
            "compression_factor must be in [{MIN_COMPRESSION}, {MAX_COMPRESSION}]"
        );
        assert!(
            universe.is_power_of_two(),
            "universe must be a positive power of two"
        );
        Self::make(compression_factor, universe)
    }

    /// Creates a digest over the universe `[0, universe)`.
    ///
    /// The panicking version of this method is [`QDigest::new`].
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidCompression`] if `compression_factor` is
    /// outside [1, 1000]; [`ErrorKind::InvalidUniverseSize`] if
    /// `universe` is not a positive power of two.
    pub fn try_new(compression_factor: u64, universe: u64) -> Result<Self, Error> {
        if !(MIN_COMPRESSION..=MAX_COMPRESSION).contains(&compression_factor) {
            return Err(Error::new(
                ErrorKind::InvalidCompression,
                format!("compression_factor must be in [{MIN_COMPRESSION}, {MAX_COMPRESSION}]"),
            )
            .with_context("compression_factor", compression_factor));
        }
        if !universe.is_power_of_two() {
            return Err(Error::new(
                ErrorKind::InvalidUniverseSize,
                "universe must be a positive power of two",
            )
            .with_context("universe", universe));
        }
        Ok(Self::make(compression_factor, universe))
    }

    fn make(compression_factor: u64, universe: u64) -> Self {
        QDigest {
            compression_factor,
            universe,
            nodes: vec![],
            total: 0,
        }
    }

    /// Adds a value to the digest.
    ///
    /// The value lands in the node whose range contains it, or starts a
    /// new point range; compression then folds low-count nodes into their
    /// contiguous neighbours.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidParameters`] if `value` is outside the
    /// universe.
    pub fn add(&mut self, value: u64) -> Result<(), Error> {
        if value >= self.universe {
            return Err(Error::invalid_parameters("value outside the universe")
                .with_context("value", value)
                .with_context("universe", self.universe));
        }
        self.insert_with_count(value, 1);
        self.compress();
        Ok(())
    }

    /// Compute the approximate value at the given quantile.
    ///
    /// Accumulates node counts in value order up to `round(q * total)`
    /// and interpolates linearly within the containing range.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidParameters`] if `q` is outside [0, 1];
    /// [`ErrorKind::EmptyDigest`] if no value has been added.
    pub fn quantile(&self, q: f64) -> Result<f64, Error> {
        if !(0.0..=1.0).contains(&q) {
            return Err(
                Error::invalid_parameters("quantile must be in [0.0, 1.0]").with_context("q", q)
            );
        }
        let last = match self.nodes.last() {
            Some(node) => node,
            None => return Err(Error::empty_digest()),
        };

        let target = (q * self.total as f64).round() as u64;
        let mut cumulative = 0u64;
        for node in &self.nodes {
            if cumulative + node.count >= target {
                let into = target - cumulative;
                let fraction = into as f64 / node.count as f64;
                return Ok(node.left as f64 + fraction * (node.right - node.left) as f64);
            }
            cumulative += node.count;
        }
        Ok(last.right as f64)
    }

    /// Compute the approximate fraction of values strictly below `value`.
    ///
    /// Nodes entirely below contribute their full count; the node
    /// containing `value` contributes in linear proportion.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::EmptyDigest`] if no value has been added.
    pub fn rank(&self, value: u64) -> Result<f64, Error> {
        if self.nodes.is_empty() {
            return Err(Error::empty_digest());
        }

        let mut below = 0.0;
        for node in &self.nodes {
            if node.right < value {
                below += node.count as f64;
            } else if node.left <= value {
                let width = (node.right - node.left + 1) as f64;
                let into = (value - node.left) as f64;
                below += node.count as f64 * (into / width);
            }
        }
        Ok(below / self.total as f64)
    }

    /// Merges another digest into this one.
    ///
    /// Each node of `other` is re-inserted at its range midpoint with its
    /// full multiplicity.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::IncompatibleDimensions`] if the compression factors
    /// or universes differ.
    pub fn merge(&mut self, other: &QDigest) -> Result<(), Error> {
        if self.compression_factor != other.compression_factor || self.universe != other.universe {
            return Err(Error::new(
                ErrorKind::IncompatibleDimensions,
                "compression factor and universe must match",
            )
            .with_context(
                "compression_factor",
                format!("{} vs {}", self.compression_factor, other.compression_factor),
            )
            .with_context(
                "universe",
                format!("{} vs {}", self.universe, other.universe),
            ));
        }
        for node in &other.nodes {
            let midpoint = node.left + (node.right - node.left) / 2;
            self.insert_with_count(midpoint, node.count);
            self.compress();
        }
        Ok(())
    }

    /// Returns the total count added so far.
    pub fn size(&self) -> u64 {
        self.total
    }

    /// Returns true if the digest has not seen any data.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the configured compression factor.
    pub fn compression_factor(&self) -> u64 {
        self.compression_factor
    }

    /// Returns the universe bound U; values live in `[0, U)`.
    pub fn universe(&self) -> u64 {
        self.universe
    }

    /// Returns the number of range nodes currently held.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn insert_with_count(&mut self, value: u64, count: u64) {
        debug_assert!(value < self.universe);
        match self
            .nodes
            .iter_mut()
            .find(|node| node.left <= value && value <= node.right)
        {
            Some(node) => node.count += count,
            None => self.nodes.push(Node {
                left: value,
                right: value,
                count,
            }),
        }
        self.total += count;
    }

    /// Folds low-count nodes into contiguous neighbours.
    ///
    /// The threshold is `total / compression_factor`; a pair of adjacent
    /// nodes merges when their ranges touch and either falls below the
    /// threshold.
    fn compress(&mut self) {
        self.nodes.sort_by_key(|node| node.left);
        if self.nodes.len() <= 1 {
            return;
        }

        let threshold = self.total as f64 / self.compression_factor as f64;
        let mut merged: Vec<Node> = Vec::with_capacity(self.nodes.len());
        for node in mem::take(&mut self.nodes) {
            if let Some(last) = merged.last_mut() {
                let contiguous = last.right + 1 == node.left;
                let low_count =
                    (node.count as f64) < threshold || (last.count as f64) < threshold;
                if contiguous && low_count {
                    last.right = node.right;
                    last.count += node.count;
                    continue;
                }
            }
            merged.push(node);
        }
        self.nodes = merged;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_empty() {
        let digest = QDigest::new(50, 1024);
        assert!(digest.is_empty());
        assert_eq!(digest.size(), 0);
        assert_eq!(digest.quantile(0.5).unwrap_err().kind(), ErrorKind::EmptyDigest);
        assert_eq!(digest.rank(10).unwrap_err().kind(), ErrorKind::EmptyDigest);
    }

    #[test]
    fn test_rejects_values_outside_universe() {
        let mut digest = QDigest::new(50, 64);
        assert!(digest.add(63).is_ok());
        let err = digest.add(64).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);
        assert_eq!(digest.size(), 1);
    }

    #[test]
    fn test_quantiles_over_uniform_input() {
        let mut digest = QDigest::new(50, 1024);
        for value in 1..=100 {
            digest.add(value).unwrap();
        }
        assert_eq!(digest.size(), 100);
        let median = digest.quantile(0.5).unwrap();
        assert!((40.0..=60.0).contains(&median), "median {median}");
        let low = digest.quantile(0.1).unwrap();
        let high = digest.quantile(0.9).unwrap();
        assert!(low < median && median < high);
    }

    #[test]
    fn test_rank_over_uniform_input() {
        let mut digest = QDigest::new(50, 1024);
        for value in 1..=100 {
            digest.add(value).unwrap();
        }
        let rank = digest.rank(50).unwrap();
        assert!((0.4..=0.6).contains(&rank), "rank {rank}");
        assert!(digest.rank(0).unwrap() < 0.05);
        assert!(digest.rank(1000).unwrap() > 0.95);
    }

    #[test]
    fn test_compression_bounds_nodes() {
        let mut digest = QDigest::new(10, 1024);
        for value in 0..1024 {
            digest.add(value).unwrap();
        }
        assert!(digest.num_nodes() <= 30, "nodes {}", digest.num_nodes());
    }

    #[test]
    fn test_constructor_bounds() {
        assert_eq!(
            QDigest::try_new(0, 1024).unwrap_err().kind(),
            ErrorKind::InvalidCompression
        );
        assert_eq!(
            QDigest::try_new(1001, 1024).unwrap_err().kind(),
            ErrorKind::InvalidCompression
        );
        assert_eq!(
            QDigest::try_new(50, 100).unwrap_err().kind(),
            ErrorKind::InvalidUniverseSize
        );
        assert_eq!(
            QDigest::try_new(50, 0).unwrap_err().kind(),
            ErrorKind::InvalidUniverseSize
        );
        assert!(QDigest::try_new(1, 1).is_ok());
    }

    #[test]
    fn test_merge_requires_matching_configuration() {
        let mut left = QDigest::new(50, 1024);
        let right = QDigest::new(50, 512);
        assert_eq!(
            left.merge(&right).unwrap_err().kind(),
            ErrorKind::IncompatibleDimensions
        );
        let right = QDigest::new(40, 1024);
        assert_eq!(
            left.merge(&right).unwrap_err().kind(),
            ErrorKind::IncompatibleDimensions
        );
    }

    #[test]
    fn test_merge_combines_counts() {
        let mut left = QDigest::new(50, 1024);
        let mut right = QDigest::new(50, 1024);
        for value in 1..=50 {
            left.add(value).unwrap();
        }
        for value in 51..=100 {
            right.add(value).unwrap();
        }
        left.merge(&right).unwrap();
        assert_eq!(left.size(), 100);
        let median = left.quantile(0.5).unwrap();
        assert!((35.0..=65.0).contains(&median), "median {median}");
    }
}
