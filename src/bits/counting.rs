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

use crate::error::Error;

/// An unsigned counter cell of fixed width.
///
/// Counting structures are generic over the cell width so callers can
/// trade memory for headroom. Mutating arithmetic is checked: overflow on
/// increment and underflow on decrement are detectable, never silent.
pub trait Counter: Copy + Default + PartialEq + Eq + PartialOrd + Ord + fmt::Debug {
    /// The all-zeros counter value.
    const ZERO: Self;
    /// The unit increment.
    const ONE: Self;
    /// The largest value this width can hold.
    const MAX: Self;

    /// Adds, returning `None` when the result would exceed [`Self::MAX`].
    fn checked_add(self, rhs: Self) -> Option<Self>;

    /// Adds, clamping at [`Self::MAX`].
    fn saturating_add(self, rhs: Self) -> Self;

    /// Subtracts, returning `None` when the result would go below zero.
    fn checked_sub(self, rhs: Self) -> Option<Self>;

    /// Subtracts, clamping at zero.
    fn saturating_sub(self, rhs: Self) -> Self;

    /// Widens the cell value to u64.
    fn to_u64(self) -> u64;

    /// Narrows a u64, returning `None` when it exceeds [`Self::MAX`].
    fn from_u64(value: u64) -> Option<Self>;
}

macro_rules! impl_counter {
    ($($ty:ty),*) => {
        $(
            impl Counter for $ty {
                const ZERO: Self = 0;
                const ONE: Self = 1;
                const MAX: Self = <$ty>::MAX;

                #[inline]
                fn checked_add(self, rhs: Self) -> Option<Self> {
                    <$ty>::checked_add(self, rhs)
                }

                #[inline]
                fn saturating_add(self, rhs: Self) -> Self {
                    <$ty>::saturating_add(self, rhs)
                }

                #[inline]
                fn checked_sub(self, rhs: Self) -> Option<Self> {
                    <$ty>::checked_sub(self, rhs)
                }

                #[inline]
                fn saturating_sub(self, rhs: Self) -> Self {
                    <$ty>::saturating_sub(self, rhs)
                }

                #[inline]
                fn to_u64(self) -> u64 {
                    u64::from(self)
                }

                #[inline]
                fn from_u64(value: u64) -> Option<Self> {
                    Self::try_from(value).ok()
                }
            }
        )*
    };
}

impl_counter!(u8, u16, u32, u64);

/// A 4-bit counter stored in a byte-aligned cell.
///
/// Values saturate their range check at 15; the unused high nibble is
/// never set. This gives counting filters the classic nibble width without
/// cross-byte packing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct U4(u8);

impl U4 {
    /// Wraps a value, returning `None` above 15.
    pub const fn new(value: u8) -> Option<Self> {
        if value <= 0xF {
            Some(U4(value))
        } else {
            None
        }
    }

    /// Returns the value as a plain byte.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Counter for U4 {
    const ZERO: Self = U4(0);
    const ONE: Self = U4(1);
    const MAX: Self = U4(0xF);

    #[inline]
    fn checked_add(self, rhs: Self) -> Option<Self> {
        U4::new(self.0 + rhs.0)
    }

    #[inline]
    fn saturating_add(self, rhs: Self) -> Self {
        U4((self.0 + rhs.0).min(0xF))
    }

    #[inline]
    fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(U4)
    }

    #[inline]
    fn saturating_sub(self, rhs: Self) -> Self {
        U4(self.0.saturating_sub(rhs.0))
    }

    #[inline]
    fn to_u64(self) -> u64 {
        u64::from(self.0)
    }

    #[inline]
    fn from_u64(value: u64) -> Option<Self> {
        u8::try_from(value).ok().and_then(U4::new)
    }
}

/// A fixed-length array of counters of width `C`.
///
/// The non-zero cell count is maintained incrementally, so
/// [`count_nonzero`](Self::count_nonzero) is O(1).
///
/// # Examples
///
/// ```
/// # use proximate::bits::CountingBitArray;
/// let mut counters = CountingBitArray::<u8>::new(64);
/// counters.increment(7).unwrap();
/// counters.increment(7).unwrap();
/// assert_eq!(counters.get(7).unwrap(), 2);
/// assert_eq!(counters.count_nonzero(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CountingBitArray<C: Counter> {
    cells: Vec<C>,
    nonzero: u64,
}

impl<C: Counter> CountingBitArray<C> {
    /// Creates an array of `len` zeroed counters.
    pub fn new(len: usize) -> Self {
        CountingBitArray {
            cells: vec![C::ZERO; len],
            nonzero: 0,
        }
    }

    /// Returns the number of counters.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the array holds no counters at all.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the counter at `index`, widened to u64.
    pub fn get(&self, index: usize) -> Result<u64, Error> {
        self.check_index(index)?;
        Ok(self.cells[index].to_u64())
    }

    /// Returns whether the counter at `index` is non-zero.
    pub fn is_set(&self, index: usize) -> Result<bool, Error> {
        self.check_index(index)?;
        Ok(self.cells[index] != C::ZERO)
    }

    /// Adds one to the counter at `index`.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::CounterOverflow`] if the counter already holds
    /// `C::MAX`; the cell is left untouched.
    ///
    /// [`ErrorKind::CounterOverflow`]: crate::error::ErrorKind::CounterOverflow
    pub fn increment(&mut self, index: usize) -> Result<(), Error> {
        self.check_index(index)?;
        if !self.increment_cell(index) {
            return Err(Error::counter_overflow(index as u64));
        }
        Ok(())
    }

    /// Subtracts one from the counter at `index`.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::CounterUnderflow`] if the counter is zero; the cell is
    /// left untouched.
    ///
    /// [`ErrorKind::CounterUnderflow`]: crate::error::ErrorKind::CounterUnderflow
    pub fn decrement(&mut self, index: usize) -> Result<(), Error> {
        self.check_index(index)?;
        if self.cells[index] == C::ZERO {
            return Err(Error::counter_underflow(index as u64));
        }
        self.decrement_cell(index);
        Ok(())
    }

    /// Subtracts one from a counter the caller has already verified to be
    /// positive.
    ///
    /// Only the index is validated; the underflow check is skipped. The
    /// subtraction clamps at zero, so a contract violation cannot corrupt
    /// neighbouring state.
    pub fn decrement_unchecked(&mut self, index: usize) -> Result<(), Error> {
        self.check_index(index)?;
        self.decrement_cell(index);
        Ok(())
    }

    /// Returns the number of non-zero counters.
    pub fn count_nonzero(&self) -> u64 {
        self.nonzero
    }

    /// Reads a cell whose index was derived modulo `len`.
    #[inline]
    pub(crate) fn cell_value(&self, index: usize) -> C {
        debug_assert!(index < self.cells.len());
        self.cells[index]
    }

    /// Checked add of one on an in-range cell; false on overflow.
    #[inline]
    pub(crate) fn increment_cell(&mut self, index: usize) -> bool {
        debug_assert!(index < self.cells.len());
        match self.cells[index].checked_add(C::ONE) {
            Some(next) => {
                if self.cells[index] == C::ZERO {
                    self.nonzero += 1;
                }
                self.cells[index] = next;
                true
            }
            None => false,
        }
    }

    /// Saturating subtract of one on an in-range cell.
    #[inline]
    pub(crate) fn decrement_cell(&mut self, index: usize) {
        debug_assert!(index < self.cells.len());
        let prev = self.cells[index];
        self.cells[index] = prev.saturating_sub(C::ONE);
        if prev == C::ONE {
            self.nonzero -= 1;
        }
    }

    fn check_index(&self, index: usize) -> Result<(), Error> {
        if index >= self.cells.len() {
            return Err(Error::invalid_index(index as u64, self.cells.len() as u64));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_increment_decrement() {
        let mut counters = CountingBitArray::<u8>::new(8);
        counters.increment(3).unwrap();
        counters.increment(3).unwrap();
        assert_eq!(counters.get(3).unwrap(), 2);
        assert!(counters.is_set(3).unwrap());
        assert_eq!(counters.count_nonzero(), 1);

        counters.decrement(3).unwrap();
        counters.decrement(3).unwrap();
        assert_eq!(counters.get(3).unwrap(), 0);
        assert_eq!(counters.count_nonzero(), 0);
    }

    #[test]
    fn test_overflow_detected_at_width() {
        let mut counters = CountingBitArray::<U4>::new(4);
        for _ in 0..15 {
            counters.increment(0).unwrap();
        }
        let err = counters.increment(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CounterOverflow);
        // rejected increment leaves the cell at its maximum
        assert_eq!(counters.get(0).unwrap(), 15);
    }

    #[test]
    fn test_underflow_detected_at_zero() {
        let mut counters = CountingBitArray::<u16>::new(4);
        let err = counters.decrement(2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CounterUnderflow);
    }

    #[test]
    fn test_unchecked_decrement_saturates() {
        let mut counters = CountingBitArray::<u8>::new(2);
        counters.increment(1).unwrap();
        counters.decrement_unchecked(1).unwrap();
        counters.decrement_unchecked(1).unwrap();
        assert_eq!(counters.get(1).unwrap(), 0);
    }

    #[test]
    fn test_out_of_range() {
        let mut counters = CountingBitArray::<u32>::new(4);
        assert_eq!(
            counters.increment(4).unwrap_err().kind(),
            ErrorKind::InvalidIndex
        );
        assert_eq!(counters.get(9).unwrap_err().kind(), ErrorKind::InvalidIndex);
    }

    #[test]
    fn test_u4_bounds() {
        assert_eq!(U4::new(15), Some(U4::MAX));
        assert_eq!(U4::new(16), None);
        assert_eq!(U4::MAX.checked_add(U4::ONE), None);
        assert_eq!(U4::ZERO.checked_sub(U4::ONE), None);
        assert_eq!(U4::from_u64(7).map(U4::get), Some(7));
    }
}
