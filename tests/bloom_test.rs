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

use proximate::bloom::BloomFilter;
use proximate::error::ErrorKind;

#[test]
fn test_insert_and_query() {
    let mut filter = BloomFilter::new(100, 0.01);
    filter.set("apple");
    filter.set("banana");

    assert!(filter.contains("apple"));
    assert!(filter.contains("banana"));
    assert!(!filter.contains("grape"));
}

#[test]
fn test_no_false_negatives() {
    let mut filter = BloomFilter::new(10_000, 0.01);
    for i in 0..10_000u32 {
        filter.set(i.to_le_bytes());
    }
    for i in 0..10_000u32 {
        assert!(filter.contains(i.to_le_bytes()));
    }
}

#[test]
fn test_false_positive_rate_is_bounded() {
    let mut filter = BloomFilter::new(10_000, 0.01);
    for i in 0..10_000u32 {
        filter.set(i.to_le_bytes());
    }
    let false_positives = (10_000..30_000u32)
        .filter(|i| filter.contains(i.to_le_bytes()))
        .count();
    // 2% observed against the 1% target leaves room for variance
    assert!(false_positives < 400, "false positives: {false_positives}");
}

#[test]
fn test_contains_and_set() {
    let mut filter = BloomFilter::new(100, 0.01);
    assert!(!filter.contains_and_set("apple"));
    assert!(filter.contains_and_set("apple"));
}

#[test]
fn test_estimated_size() {
    let mut filter = BloomFilter::new(1000, 0.01);
    assert_eq!(filter.estimated_size(), 0);
    for i in 0..800u32 {
        filter.set(i.to_le_bytes());
    }
    let estimate = filter.estimated_size();
    assert!((650..=950).contains(&estimate), "estimate {estimate}");
}

#[test]
fn test_saturated_filter_estimate_clamps_to_zero() {
    // a 2 bit filter saturates after a handful of inserts
    let mut filter = BloomFilter::new(1, 0.5);
    for i in 0..20u32 {
        filter.set(i.to_le_bytes());
    }
    assert_eq!(filter.estimated_size(), 0);
}

#[test]
fn test_union_is_monotone_over_members() {
    let mut left = BloomFilter::new(1000, 0.01);
    let mut right = BloomFilter::new(1000, 0.01);
    for i in 0..300u32 {
        left.set(i.to_le_bytes());
        right.set((i + 1000).to_le_bytes());
    }

    left.union(&right);
    for i in 0..300u32 {
        assert!(left.contains(i.to_le_bytes()));
        assert!(left.contains((i + 1000).to_le_bytes()));
    }
}

#[test]
fn test_invalid_parameters() {
    assert_eq!(
        BloomFilter::try_new(0, 0.01).unwrap_err().kind(),
        ErrorKind::InvalidParameters
    );
    assert_eq!(
        BloomFilter::try_new(100, 1.2).unwrap_err().kind(),
        ErrorKind::InvalidParameters
    );
}
