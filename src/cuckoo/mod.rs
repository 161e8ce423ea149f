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

//! Cuckoo filter for approximate set membership with deletions.
//!
//! Compared to Bloom filters, cuckoo filters support deletion while
//! keeping a compact in-memory representation. Each item is reduced to a
//! short non-zero fingerprint that may live in one of two candidate
//! buckets; the partial-key XOR construction lets either bucket derive the
//! other, which is what makes displacement (and therefore deletion)
//! possible.
//!
//! # References
//!
//! - Fan et al. (2014). "Cuckoo Filter: Practically Better Than Bloom"

mod sketch;

pub use self::sketch::CuckooFilter;
pub use self::sketch::Fingerprint;
