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

//! The Bloom filter family for probabilistic set membership testing.
//!
//! A Bloom filter is a space-efficient probabilistic data structure used to
//! test whether an element is a member of a set. False positive matches are
//! possible, but false negatives are not: a query returns either "possibly
//! in set" or "definitely not in set".
//!
//! Three variants live here:
//!
//! - [`BloomFilter`]: the classic bit-array filter. Items can only be
//!   added, never removed.
//! - [`CountingBloomFilter`]: replaces each bit with a fixed-width counter
//!   so items can be removed, at a memory cost chosen by the counter width.
//! - [`ScalableBloomFilter`]: grows by appending progressively tighter
//!   component filters when capacity is exceeded, keeping the compound
//!   false positive rate bounded.
//!
//! # Usage
//!
//! ```rust
//! use proximate::bloom::BloomFilter;
//!
//! // Optimal parameters for 1000 items with 1% false positive rate
//! let mut filter = BloomFilter::new(1000, 0.01);
//!
//! filter.set("apple");
//! filter.set("banana");
//!
//! assert!(filter.contains("apple")); // true - definitely inserted
//! assert!(!filter.contains("grape")); // false - never inserted (probably)
//! ```
//!
//! All three variants derive their probe positions with double hashing
//! (Kirsch-Mitzenmacher method) over the two crate base hashes.
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/time trade-offs in hash coding with allowable errors"
//! - Kirsch and Mitzenmacher (2008). "Less Hashing, Same Performance: Building a Better Bloom
//!   Filter"
//! - Almeida et al. (2007). "Scalable Bloom Filters"

mod counting;
mod scalable;
mod sketch;

pub use self::counting::CountingBloomFilter;
pub use self::scalable::ScalableBloomFilter;
pub use self::sketch::BloomFilter;
