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

//! Parameter derivation shared by the Bloom filter family.

use std::f64::consts::LN_2;

/// Optimal number of bits for `expected_items` at the target false
/// positive probability.
///
/// Formula: `m = ceil(-n * ln(p) / ln(2)^2)`
///
/// # Examples
///
/// ```
/// # use proximate::common::optimal_num_bits;
/// let bits = optimal_num_bits(1000, 0.01);
/// assert!(bits > 9000 && bits < 10000); // ~9586 bits
/// ```
pub fn optimal_num_bits(expected_items: u64, fpp: f64) -> u64 {
    let n = expected_items as f64;
    let bits = (-n * fpp.ln() / (LN_2 * LN_2)).ceil();
    (bits as u64).max(1)
}

/// Optimal number of hash functions for `num_bits` and `expected_items`.
///
/// Formula: `k = round((m/n) * ln(2))`, clamped to `[1, 255]`.
///
/// # Examples
///
/// ```
/// # use proximate::common::optimal_num_hashes;
/// assert_eq!(optimal_num_hashes(9586, 1000), 7); // optimal k ~= 6.64
/// ```
pub fn optimal_num_hashes(num_bits: u64, expected_items: u64) -> u32 {
    let m = num_bits as f64;
    let n = expected_items as f64;
    let k = (m / n * LN_2).round();
    (k as u32).clamp(1, 255)
}
