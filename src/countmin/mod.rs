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

//! Count-Min sketch for estimating item frequencies.
//!
//! A Count-Min sketch maintains a d x w matrix of counters. Every update
//! increments one counter per row; an estimate is the minimum over the d
//! row counters, which can only overestimate the true frequency, never
//! undercount it.
//!
//! # References
//!
//! - Cormode and Muthukrishnan (2005). "An Improved Data Stream Summary:
//!   The Count-Min Sketch and its Applications"

mod sketch;

pub use self::sketch::CountMinSketch;
