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

//! HyperLogLog for approximate distinct counting.
//!
//! A HyperLogLog summarizes a stream into 2^p six-bit registers, each
//! remembering the longest run of leading zero bits observed among the
//! items routed to it. The harmonic mean of the registers yields a
//! cardinality estimate whose relative error is about `1.04 / sqrt(2^p)`.
//!
//! The estimator applies the standard corrections: linear counting while
//! registers are still mostly empty, and the large-range adjustment as the
//! estimate approaches the 32-bit hash space.
//!
//! # References
//!
//! - Flajolet et al. (2007). "HyperLogLog: the analysis of a near-optimal
//!   cardinality estimation algorithm"

mod registers;
mod sketch;

pub use self::sketch::HyperLogLog;
