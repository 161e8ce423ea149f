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

//! Quotient filter for probabilistic set membership testing.
//!
//! A quotient filter splits each key's hash into a quotient (the canonical
//! slot index) and a remainder (a short tag stored in the slot). Collisions
//! shift entries into neighbouring slots, recorded by three metadata bits
//! per slot: *occupied*, *continuation* and *shifted*.
//!
//! This implementation uses the simplified linear-probing variant of the
//! structure: insertions probe forward from the canonical slot and tag
//! displaced entries, rather than maintaining fully sorted runs. Membership
//! after insertion is always reported, and the false positive rate stays
//! bounded by the remainder width at reasonable load.
//!
//! # References
//!
//! - Bender et al. (2012). "Don't Thrash: How to Cache Your Hash on Flash"

mod sketch;

pub use self::sketch::QuotientFilter;
