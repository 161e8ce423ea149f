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

//! # Proximate
//!
//! A library of probabilistic data structures that approximate set
//! membership, cardinality, frequency and quantile queries over streaming
//! or bulk data. Each structure trades exact answers for sublinear memory
//! and constant-time operations.
//!
//! This library is divided into modules that constitute distinct groups of
//! functionality:
//!
//! - [`bloom`]: Bloom filter, counting Bloom filter and scalable Bloom
//!   filter for approximate set membership.
//! - [`quotient`]: quotient filter, a compact membership filter keyed on
//!   hash quotient/remainder splits.
//! - [`cuckoo`]: cuckoo filter, a membership filter with deletion support.
//! - [`countmin`]: Count-Min sketch for approximate item frequencies.
//! - [`hll`]: HyperLogLog for approximate distinct counting.
//! - [`tdigest`]: t-digest for approximate quantiles over floating-point
//!   streams.
//! - [`qdigest`]: q-digest for approximate quantiles over a bounded
//!   integer universe.
//!
//! The shared foundation lives in [`bits`] (packed bit and counter
//! arrays), [`hash`] (the double-hashing convention used by every filter)
//! and [`common`] (filter parameter derivation).
//!
//! All set-membership and frequency structures key on opaque byte strings:
//! anything `AsRef<[u8]>` can be inserted, and keys are never stored.
//! Instances are single-owner and synchronous; callers needing parallel
//! access wrap them in external synchronization.

pub mod bits;
pub mod bloom;
pub mod common;
pub mod countmin;
pub mod cuckoo;
pub mod error;
pub mod hash;
pub mod hll;
pub mod qdigest;
pub mod quotient;
pub mod tdigest;
