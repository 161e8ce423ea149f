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

use googletest::assert_that;
use googletest::prelude::near;
use proximate::error::ErrorKind;
use proximate::qdigest::QDigest;

#[test]
fn test_uniform_ramp_quantile_and_rank() {
    let mut digest = QDigest::new(50, 1024);
    for value in 1..=100 {
        digest.add(value).unwrap();
    }

    let median = digest.quantile(0.5).unwrap();
    assert!((40.0..=60.0).contains(&median), "median {median}");

    let rank = digest.rank(50).unwrap();
    assert!((0.4..=0.6).contains(&rank), "rank {rank}");
}

#[test]
fn test_rank_tracks_position() {
    let mut digest = QDigest::new(50, 1024);
    for value in 0..512 {
        digest.add(value).unwrap();
    }
    assert_that!(digest.rank(128).unwrap(), near(0.25, 0.05));
    assert_that!(digest.rank(384).unwrap(), near(0.75, 0.05));
    assert_eq!(digest.rank(1023).unwrap(), 1.0);
}

#[test]
fn test_skewed_input() {
    let mut digest = QDigest::new(20, 256);
    for _ in 0..900 {
        digest.add(5).unwrap();
    }
    for value in 100..200 {
        digest.add(value).unwrap();
    }
    // 90% of the mass sits at 5
    let q = digest.quantile(0.5).unwrap();
    assert!(q <= 16.0, "q {q}");
}

#[test]
fn test_universe_boundaries() {
    assert_eq!(
        QDigest::try_new(50, 100).unwrap_err().kind(),
        ErrorKind::InvalidUniverseSize
    );
    assert_eq!(
        QDigest::try_new(50, 0).unwrap_err().kind(),
        ErrorKind::InvalidUniverseSize
    );
    assert_eq!(
        QDigest::try_new(0, 1024).unwrap_err().kind(),
        ErrorKind::InvalidCompression
    );

    let mut digest = QDigest::new(50, 1024);
    assert_eq!(
        digest.add(1024).unwrap_err().kind(),
        ErrorKind::InvalidParameters
    );
    assert_eq!(
        digest.add(4096).unwrap_err().kind(),
        ErrorKind::InvalidParameters
    );
}

#[test]
fn test_empty_digest_rejects_queries() {
    let digest = QDigest::new(50, 1024);
    assert_eq!(
        digest.quantile(0.5).unwrap_err().kind(),
        ErrorKind::EmptyDigest
    );
    assert_eq!(digest.rank(1).unwrap_err().kind(), ErrorKind::EmptyDigest);
}

#[test]
fn test_merge_approximates_combined_stream() {
    let mut left = QDigest::new(50, 1024);
    let mut right = QDigest::new(50, 1024);
    for value in 0..256 {
        left.add(value).unwrap();
        right.add(value + 256).unwrap();
    }
    left.merge(&right).unwrap();
    assert_eq!(left.size(), 512);
    let median = left.quantile(0.5).unwrap();
    assert!((200.0..=320.0).contains(&median), "median {median}");
}

#[test]
fn test_merge_rejects_mismatched_digests() {
    let mut left = QDigest::new(50, 1024);
    let right = QDigest::new(50, 2048);
    assert_eq!(
        left.merge(&right).unwrap_err().kind(),
        ErrorKind::IncompatibleDimensions
    );
}
