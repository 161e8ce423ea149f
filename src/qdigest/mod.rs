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

//! Q-Digest sketch for quantiles over a bounded integer universe.
//!
//! A q-digest summarizes integer values drawn from `[0, U)` (U a power of
//! two) as a list of range nodes with counts. Compression folds
//! low-count nodes into contiguous neighbours, so dense regions keep fine
//! ranges while sparse regions coarsen. Quantile and rank queries
//! interpolate linearly inside the containing range.
//!
//! # References
//!
//! - Shrivastava et al. (2004). "Medians and Beyond: New Aggregation
//!   Techniques for Sensor Networks"

mod sketch;

pub use self::sketch::QDigest;
