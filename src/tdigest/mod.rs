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

//! T-Digest sketch for estimating quantiles and ranks.
//!
//! A t-digest summarizes a stream of floating-point values as a sorted
//! list of centroids, each a (mean, weight) cluster. The compression
//! parameter bounds how aggressively adjacent clusters merge: small
//! clusters survive near the distribution tails, which is what keeps
//! extreme quantiles accurate.
//!
//! Quantile and rank queries interpolate linearly between neighbouring
//! centroid means, weighting each centroid as if half its mass sits on
//! either side of its mean.
//!
//! # References
//!
//! - Dunning and Ertl (2019). "Computing Extremely Accurate Quantiles
//!   Using t-Digests"

mod sketch;

pub use self::sketch::TDigest;
