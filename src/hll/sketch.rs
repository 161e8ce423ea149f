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

use crate::error::Error;
use crate::error::ErrorKind;
use crate::hash::murmur3_32;
use crate::hash::DEFAULT_SKETCH_SEED;
use crate::hll::registers::RegisterArray;

const MIN_PRECISION: u8 = 4;
const MAX_PRECISION: u8 = 16;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// HyperLogLog sketch for approximate distinct counting.
///
/// Precision `p` in [4, 16] allocates 2^p registers; higher precision
/// costs memory and buys accuracy. The estimator is deterministic: the
/// same item stream always produces the same estimate.
///
/// # Examples
///
/// ```
/// # use proximate::hll::HyperLogLog;
/// let mut hll = HyperLogLog::new(12);
/// for i in 0..1000u32 {
///     hll.add(i.to_le_bytes());
/// }
/// let estimate = hll.estimated_size();
/// assert!((900..=1100).contains(&estimate));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HyperLogLog {
    precision: u8,
    registers: RegisterArray,
}

impl HyperLogLog {
    /// Creates a sketch with 2^p registers.
    ///
    /// The fallible version of this method is [`HyperLogLog::try_new`].
    ///
    /// # Panics
    ///
    /// Panics if `precision` is outside [4, 16].
    ///
    /// # Examples
    ///
    /// ```
    /// # use proximate::hll::HyperLogLog;
    /// let hll = HyperLogLog::new(10);
    /// assert_eq!(hll.num_registers(), 1024);
    /// ```
    pub fn new(precision: u8) -> Self {
        assert!(
            (MIN_PRECISION..=MAX_PRECISION).contains(&precision),
            "precision must be in [{MIN_PRECISION}, {MAX_PRECISION}]"
        );
        Self::make(precision)
    }

    /// Creates a sketch with 2^p registers.
    ///
    /// The panicking version of this method is [`HyperLogLog::new`].
    ///
    /// # Errors
    ///
    /// If `precision` is outside [4, 16], returns
    /// [`ErrorKind::InvalidPrecision`].
    pub fn try_new(precision: u8) -> Result<Self, Error> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(Error::new(
                ErrorKind::InvalidPrecision,
                format!("precision must be in [{MIN_PRECISION}, {MAX_PRECISION}]"),
            )
            .with_context("precision", precision));
        }
        Ok(Self::make(precision))
    }

    fn make(precision: u8) -> Self {
        HyperLogLog {
            precision,
            registers: RegisterArray::new(1 << precision),
        }
    }

    /// Adds an item to the stream summary.
    ///
    /// The top p bits of the item's 32-bit hash select a register; the
    /// register keeps the maximum leading-zero rank of the remaining bits.
    pub fn add(&mut self, item: impl AsRef<[u8]>) {
        let hash = murmur3_32(item.as_ref(), DEFAULT_SKETCH_SEED);
        let slot = hash >> (32 - self.precision);
        let suffix = hash << self.precision;
        let rank = (suffix.leading_zeros() + 1).min(31) as u8;
        self.registers.update_max(slot, rank);
    }

    /// Returns the estimated number of distinct items added.
    ///
    /// The raw harmonic-mean estimate is corrected at both extremes:
    /// linear counting while any register is still zero and the estimate
    /// is small, and the 32-bit range correction near the top.
    pub fn estimated_size(&self) -> u64 {
        let m = f64::from(self.registers.num_registers());

        let mut sum = 0.0;
        let mut zeros = 0u32;
        for rank in self.registers.iter() {
            sum += 1.0 / f64::from(1u32 << u32::from(rank).min(31));
            if rank == 0 {
                zeros += 1;
            }
        }

        let raw = alpha(self.registers.num_registers()) * m * m / sum;
        let estimate = if raw <= 2.5 * m && zeros > 0 {
            // linear counting
            m * (m / f64::from(zeros)).ln()
        } else if raw <= TWO_POW_32 / 30.0 {
            raw
        } else {
            -TWO_POW_32 * (1.0 - raw / TWO_POW_32).ln()
        };

        estimate.max(0.0).round() as u64
    }

    /// Merges another sketch into this one by register-wise maximum.
    ///
    /// Merging is idempotent and commutative, so a sketch may absorb the
    /// same peer repeatedly without drift.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::IncompatiblePrecision`] if the precisions differ.
    ///
    /// # Examples
    ///
    /// ```
    /// # use proximate::hll::HyperLogLog;
    /// let mut left = HyperLogLog::new(10);
    /// let mut right = HyperLogLog::new(10);
    /// left.add("a");
    /// right.add("b");
    /// left.merge(&right).unwrap();
    /// assert_eq!(left.estimated_size(), 2);
    /// ```
    pub fn merge(&mut self, other: &HyperLogLog) -> Result<(), Error> {
        if self.precision != other.precision {
            return Err(Error::new(
                ErrorKind::IncompatiblePrecision,
                "precisions must match",
            )
            .with_context("left", self.precision)
            .with_context("right", other.precision));
        }
        for slot in 0..self.registers.num_registers() {
            self.registers.update_max(slot, other.registers.get(slot));
        }
        Ok(())
    }

    /// Returns the configured precision (p).
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Returns the number of registers (2^p).
    pub fn num_registers(&self) -> u32 {
        self.registers.num_registers()
    }

    /// Returns true if no item has been added.
    pub fn is_empty(&self) -> bool {
        self.registers.iter().all(|rank| rank == 0)
    }
}

/// Bias correction constant for the raw estimator.
fn alpha(num_registers: u32) -> f64 {
    match num_registers {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        m => 0.7213 / (1.0 + 1.079 / f64::from(m)),
    }
}
