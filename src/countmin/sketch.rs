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

use std::f64::consts::E;

use crate::bits::Counter;
use crate::error::Error;
use crate::error::ErrorKind;
use crate::hash::HashPair;

/// Count-Min sketch for estimating item frequencies.
///
/// The sketch provides upper-bounded estimates of item frequencies with
/// configurable relative error (width) and confidence (depth). Counter
/// cells are generic over [`Counter`] so callers can size the matrix for
/// their expected weights.
///
/// # Examples
///
/// ```
/// # use proximate::countmin::CountMinSketch;
/// let mut sketch = CountMinSketch::<u32>::new(128, 4);
/// sketch.set("apple").unwrap();
/// sketch.set_count("banana", 3).unwrap();
/// assert!(sketch.estimate("apple") >= 1);
/// assert!(sketch.estimate("banana") >= 3);
/// assert_eq!(sketch.estimate("never"), 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CountMinSketch<C: Counter> {
    width: u32,
    depth: u32,
    total_weight: u64,
    counts: Vec<C>,
}

impl<C: Counter> CountMinSketch<C> {
    /// Creates a sketch with an explicit counter matrix shape.
    ///
    /// The fallible version of this method is [`CountMinSketch::try_new`].
    ///
    /// # Panics
    ///
    /// Panics if `width` or `depth` is 0.
    pub fn new(width: u32, depth: u32) -> Self {
        assert!(width > 0, "width must be greater than 0");
        assert!(depth > 0, "depth must be greater than 0");
        Self::make(width, depth)
    }

    /// Creates a sketch with an explicit counter matrix shape.
    ///
    /// The panicking version of this method is [`CountMinSketch::new`].
    ///
    /// # Errors
    ///
    /// If `width` or `depth` is 0, returns
    /// [`ErrorKind::InvalidParameters`].
    pub fn try_new(width: u32, depth: u32) -> Result<Self, Error> {
        if width == 0 {
            return Err(Error::invalid_parameters("width must be greater than 0"));
        }
        if depth == 0 {
            return Err(Error::invalid_parameters("depth must be greater than 0"));
        }
        Ok(Self::make(width, depth))
    }

    /// Creates a sketch sized for a relative error and failure probability.
    ///
    /// Width is `ceil(e / epsilon)` and depth `ceil(ln(1 / delta))`: an
    /// estimate exceeds the true frequency by more than `epsilon * N` with
    /// probability at most `delta`.
    ///
    /// # Errors
    ///
    /// If `epsilon` or `delta` is outside (0, 1), returns
    /// [`ErrorKind::InvalidParameters`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use proximate::countmin::CountMinSketch;
    /// let sketch = CountMinSketch::<u32>::new_with_error(0.01, 0.01).unwrap();
    /// assert_eq!(sketch.width(), 272);
    /// assert_eq!(sketch.depth(), 5);
    /// ```
    pub fn new_with_error(epsilon: f64, delta: f64) -> Result<Self, Error> {
        if !(epsilon > 0.0 && epsilon < 1.0) {
            return Err(
                Error::invalid_parameters("epsilon must be between 0.0 and 1.0 (exclusive)")
                    .with_context("epsilon", epsilon),
            );
        }
        if !(delta > 0.0 && delta < 1.0) {
            return Err(
                Error::invalid_parameters("delta must be between 0.0 and 1.0 (exclusive)")
                    .with_context("delta", delta),
            );
        }
        let width = (E / epsilon).ceil() as u32;
        let depth = (1.0 / delta).ln().ceil() as u32;
        Ok(Self::make(width.max(1), depth.max(1)))
    }

    fn make(width: u32, depth: u32) -> Self {
        CountMinSketch {
            width,
            depth,
            total_weight: 0,
            counts: vec![C::ZERO; width as usize * depth as usize],
        }
    }

    /// Returns the number of counters per row (w).
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the number of rows (d).
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Returns the total weight inserted into the sketch.
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Returns true if the sketch has not seen any updates.
    pub fn is_empty(&self) -> bool {
        self.total_weight == 0
    }

    /// Updates the sketch with a single occurrence of the item.
    ///
    /// # Errors
    ///
    /// See [`set_count`](Self::set_count).
    pub fn set(&mut self, item: impl AsRef<[u8]>) -> Result<(), Error> {
        self.set_count(item, 1)
    }

    /// Updates the sketch with the given item and weight.
    ///
    /// One counter per row is raised by `count`; updates are all-or-
    /// nothing, so a failed update leaves every cell as it was.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::CounterOverflow`] if any touched cell cannot absorb
    /// the weight.
    ///
    /// [`ErrorKind::CounterOverflow`]: crate::error::ErrorKind::CounterOverflow
    pub fn set_count(&mut self, item: impl AsRef<[u8]>, count: u64) -> Result<(), Error> {
        if count == 0 {
            return Ok(());
        }
        let weight = C::from_u64(count).ok_or_else(|| {
            Error::new(ErrorKind::CounterOverflow, "weight exceeds counter width")
                .with_context("count", count)
        })?;
        let pair = HashPair::split64(item.as_ref());
        let cells: Vec<usize> = (0..self.depth)
            .map(|row| self.cell_index(row, pair))
            .collect();
        for &cell in &cells {
            if self.counts[cell].checked_add(weight).is_none() {
                return Err(Error::counter_overflow(cell as u64));
            }
        }
        for &cell in &cells {
            // verified above, cannot clamp
            self.counts[cell] = self.counts[cell].saturating_add(weight);
        }
        self.total_weight = self.total_weight.saturating_add(count);
        Ok(())
    }

    /// Returns the estimated frequency of the given item.
    ///
    /// The estimate is the minimum over the d row counters, an upper bound
    /// on the true frequency of any item inserted via
    /// [`set_count`](Self::set_count).
    pub fn estimate(&self, item: impl AsRef<[u8]>) -> u64 {
        let pair = HashPair::split64(item.as_ref());
        (0..self.depth)
            .map(|row| self.counts[self.cell_index(row, pair)].to_u64())
            .min()
            .unwrap_or(0)
    }

    /// Merges another sketch into this one by cell-wise addition.
    ///
    /// The merge is all-or-nothing: every pair of cells is checked before
    /// any is modified.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::IncompatibleDimensions`] if the shapes differ;
    /// [`ErrorKind::CounterOverflow`] if any cell-wise sum exceeds the
    /// counter width.
    ///
    /// [`ErrorKind::IncompatibleDimensions`]: crate::error::ErrorKind::IncompatibleDimensions
    /// [`ErrorKind::CounterOverflow`]: crate::error::ErrorKind::CounterOverflow
    pub fn merge(&mut self, other: &CountMinSketch<C>) -> Result<(), Error> {
        if self.width != other.width || self.depth != other.depth {
            return Err(Error::new(
                ErrorKind::IncompatibleDimensions,
                "sketch dimensions must match",
            )
            .with_context("width", format!("{} vs {}", self.width, other.width))
            .with_context("depth", format!("{} vs {}", self.depth, other.depth)));
        }
        for (cell, (&dst, &src)) in self.counts.iter().zip(other.counts.iter()).enumerate() {
            if dst.checked_add(src).is_none() {
                return Err(Error::counter_overflow(cell as u64));
            }
        }
        for (dst, &src) in self.counts.iter_mut().zip(other.counts.iter()) {
            // verified above, cannot clamp
            *dst = dst.saturating_add(src);
        }
        self.total_weight = self.total_weight.saturating_add(other.total_weight);
        Ok(())
    }

    /// The cell touched by `pair` in the given row.
    ///
    /// Row columns come from double hashing with an odd stride, so every
    /// row probes a distinct permutation of its columns.
    #[inline]
    fn cell_index(&self, row: u32, pair: HashPair) -> usize {
        let column = pair.index(row, u64::from(self.width)) as usize;
        row as usize * self.width as usize + column
    }
}
