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
use crate::hash::xxhash64;
use crate::hash::DEFAULT_SKETCH_SEED;

const OCCUPIED: u64 = 1;
const CONTINUATION: u64 = 1 << 1;
const SHIFTED: u64 = 1 << 2;
const METADATA_MASK: u64 = OCCUPIED | CONTINUATION | SHIFTED;
const METADATA_BITS: u32 = 3;

/// A quotient filter for probabilistic set membership testing.
///
/// Configured by `quotient_bits` (q, giving 2^q slots) and
/// `remainder_bits` (r, the per-slot tag width). Each slot packs the
/// remainder and the three metadata bits into one word.
///
/// # Examples
///
/// ```
/// # use proximate::quotient::QuotientFilter;
/// let mut filter = QuotientFilter::new(10, 8);
/// filter.set("apple").unwrap();
/// assert!(filter.contains("apple"));
/// assert!(!filter.contains("grape"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QuotientFilter {
    quotient_bits: u32,
    remainder_bits: u32,
    /// 2^q slots, each `remainder << 3 | metadata`
    slots: Vec<u64>,
    len: u64,
}

impl QuotientFilter {
    /// Creates a filter with 2^q slots and r-bit remainders.
    ///
    /// The fallible version of this method is [`QuotientFilter::try_new`].
    ///
    /// # Panics
    ///
    /// Panics unless 1 <= q <= 32, r >= 1 and q + r <= 64.
    ///
    /// # Examples
    ///
    /// ```
    /// # use proximate::quotient::QuotientFilter;
    /// let filter = QuotientFilter::new(8, 8);
    /// assert_eq!(filter.num_slots(), 256);
    /// ```
    pub fn new(quotient_bits: u32, remainder_bits: u32) -> Self {
        assert!(
            (1..=32).contains(&quotient_bits),
            "quotient_bits must be in [1, 32]"
        );
        assert!(remainder_bits >= 1, "remainder_bits must be at least 1");
        assert!(
            quotient_bits + remainder_bits <= 64,
            "quotient_bits + remainder_bits must not exceed 64"
        );
        Self::make(quotient_bits, remainder_bits)
    }

    /// Creates a filter with 2^q slots and r-bit remainders.
    ///
    /// The panicking version of this method is [`QuotientFilter::new`].
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidParameters`] unless 1 <= q <= 32, r >= 1 and
    /// q + r <= 64.
    ///
    /// [`ErrorKind::InvalidParameters`]: crate::error::ErrorKind::InvalidParameters
    pub fn try_new(quotient_bits: u32, remainder_bits: u32) -> Result<Self, Error> {
        if !(1..=32).contains(&quotient_bits) {
            return Err(Error::invalid_parameters("quotient_bits must be in [1, 32]")
                .with_context("quotient_bits", quotient_bits));
        }
        if remainder_bits == 0 {
            return Err(Error::invalid_parameters("remainder_bits must be at least 1"));
        }
        if quotient_bits + remainder_bits > 64 {
            return Err(Error::invalid_parameters(
                "quotient_bits + remainder_bits must not exceed 64",
            )
            .with_context("quotient_bits", quotient_bits)
            .with_context("remainder_bits", remainder_bits));
        }
        Ok(Self::make(quotient_bits, remainder_bits))
    }

    fn make(quotient_bits: u32, remainder_bits: u32) -> Self {
        QuotientFilter {
            quotient_bits,
            remainder_bits,
            slots: vec![0u64; 1usize << quotient_bits],
            len: 0,
        }
    }

    /// Inserts an item.
    ///
    /// The canonical slot is tried first; on collision the filter probes
    /// forward for an empty slot, tagging the placement as a shifted
    /// continuation and marking the canonical slot occupied. Re-inserting
    /// a key whose remainder already sits in its canonical slot is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::FilterFull`] when every slot is in use.
    ///
    /// [`ErrorKind::FilterFull`]: crate::error::ErrorKind::FilterFull
    pub fn set(&mut self, item: impl AsRef<[u8]>) -> Result<(), Error> {
        let (canonical, remainder) = self.split(item.as_ref());

        if self.is_slot_empty(canonical) {
            self.slots[canonical] = (remainder << METADATA_BITS) | OCCUPIED;
            self.len += 1;
            return Ok(());
        }
        if self.slot_remainder(canonical) == remainder {
            return Ok(());
        }

        let num_slots = self.slots.len();
        let mut probe = (canonical + 1) & (num_slots - 1);
        while probe != canonical {
            if self.is_slot_empty(probe) {
                self.slots[probe] = (remainder << METADATA_BITS) | CONTINUATION | SHIFTED;
                self.slots[canonical] |= OCCUPIED;
                self.len += 1;
                return Ok(());
            }
            // every slot probed past must stay traversable, or the scan
            // would stop short of the placement
            self.slots[probe] |= CONTINUATION;
            probe = (probe + 1) & (num_slots - 1);
        }
        Err(Error::filter_full("all quotient filter slots are in use")
            .with_context("num_slots", num_slots))
    }

    /// Tests whether an item is possibly in the set.
    ///
    /// Returns `false` immediately when the canonical slot's occupied bit
    /// is clear; otherwise scans forward comparing remainders until a
    /// match, a gap, or a slot that does not continue the probe chain.
    pub fn contains(&self, item: impl AsRef<[u8]>) -> bool {
        let (canonical, remainder) = self.split(item.as_ref());

        if self.slots[canonical] & OCCUPIED == 0 {
            return false;
        }

        let num_slots = self.slots.len();
        let mut probe = canonical;
        loop {
            if probe != canonical {
                if self.is_slot_empty(probe) {
                    return false;
                }
                if self.slots[probe] & CONTINUATION == 0 {
                    return false;
                }
            }
            if self.slot_remainder(probe) == remainder {
                return true;
            }
            probe = (probe + 1) & (num_slots - 1);
            if probe == canonical {
                return false;
            }
        }
    }

    /// Returns the number of slots (2^q).
    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    /// Returns the remainder width in bits (r).
    pub fn remainder_bits(&self) -> u32 {
        self.remainder_bits
    }

    /// Returns the number of occupied slots.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns true if no item has been inserted.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Splits an item's hash into (canonical slot, remainder).
    ///
    /// Takes the top q+r bits of the 64-bit hash: the high q bits select
    /// the slot, the low r bits form the tag.
    fn split(&self, item: &[u8]) -> (usize, u64) {
        let hash = xxhash64(item, u64::from(DEFAULT_SKETCH_SEED));
        let window = hash >> (64 - self.quotient_bits - self.remainder_bits);
        let quotient = window >> self.remainder_bits;
        let remainder = window & ((1u64 << self.remainder_bits) - 1);
        (quotient as usize, remainder)
    }

    #[inline]
    fn is_slot_empty(&self, index: usize) -> bool {
        self.slots[index] & METADATA_MASK == 0
    }

    #[inline]
    fn slot_remainder(&self, index: usize) -> u64 {
        self.slots[index] >> METADATA_BITS
    }
}
