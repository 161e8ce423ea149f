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

use proximate::bits::U4;
use proximate::bloom::CountingBloomFilter;
use proximate::error::ErrorKind;

#[test]
fn test_multiset_insert_and_remove() {
    let mut filter = CountingBloomFilter::<u8>::new(100, 0.01);
    filter.set("apple").unwrap();
    filter.set("apple").unwrap();
    filter.set("banana").unwrap();

    assert!(filter.remove("apple"));
    assert!(filter.contains("apple"));
    assert!(filter.remove("apple"));
    assert!(!filter.contains("apple"));

    filter.remove_safe("banana").unwrap();
    assert!(!filter.contains("banana"));

    let err = filter.remove_safe("zebra").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CounterUnderflow);
}

#[test]
fn test_k_removals_clear_k_insertions() {
    let mut filter = CountingBloomFilter::<u16>::new(1000, 0.01);
    for _ in 0..5 {
        filter.set("apple").unwrap();
    }
    for _ in 0..5 {
        assert!(filter.remove("apple"));
    }
    assert!(!filter.contains("apple"));
}

#[test]
fn test_remove_missing_is_a_noop() {
    let mut filter = CountingBloomFilter::<u8>::new(100, 0.01);
    filter.set("apple").unwrap();
    assert!(!filter.remove("zebra"));
    assert!(filter.contains("apple"));
    assert!(filter.remove("apple"));
}

#[test]
fn test_overflow_detected_exactly_at_counter_width() {
    // u8 counters saturate their error check at 2^8 - 1 insertions
    let mut filter = CountingBloomFilter::<u8>::new(100, 0.01);
    for _ in 0..255 {
        filter.set("apple").unwrap();
    }
    let err = filter.set("apple").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CounterOverflow);

    // nibble counters hit the same wall at 2^4 - 1
    let mut filter = CountingBloomFilter::<U4>::new(100, 0.01);
    for _ in 0..15 {
        filter.set("apple").unwrap();
    }
    let err = filter.set("apple").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CounterOverflow);
}

#[test]
fn test_estimated_size_shrinks_with_removals() {
    let mut filter = CountingBloomFilter::<u8>::new(1000, 0.01);
    for i in 0..200u32 {
        filter.set(i.to_le_bytes()).unwrap();
    }
    let before = filter.estimated_size();
    for i in 0..100u32 {
        assert!(filter.remove(i.to_le_bytes()));
    }
    let after = filter.estimated_size();
    assert!(after < before, "{after} >= {before}");
    assert!((60..=140).contains(&after), "estimate {after}");
}

#[test]
fn test_saturated_filter_estimate_clamps_to_zero() {
    // 2 cells, 1 hash; every cell is non-zero after a handful of inserts
    let mut filter = CountingBloomFilter::<u8>::new(1, 0.5);
    for i in 0..20u32 {
        filter.set(i.to_le_bytes()).unwrap();
    }
    assert_eq!(filter.estimated_size(), 0);
}

#[test]
fn test_invalid_parameters() {
    assert_eq!(
        CountingBloomFilter::<u8>::try_new(0, 0.01).unwrap_err().kind(),
        ErrorKind::InvalidParameters
    );
    assert_eq!(
        CountingBloomFilter::<u8>::try_new(100, 0.0)
            .unwrap_err()
            .kind(),
        ErrorKind::InvalidParameters
    );
}
