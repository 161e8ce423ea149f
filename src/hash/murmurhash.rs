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

use byteorder::ByteOrder;
use byteorder::LE;

const C1: u32 = 0xcc9e2d51;
const C2: u32 = 0x1b873593;

/// MurmurHash3 x86_32: a fast, non-cryptographic 32-bit hash with
/// excellent avalanche properties.
///
/// Filters in this crate hash complete keys in one shot, so this is the
/// one-shot form rather than a streaming [`std::hash::Hasher`].
pub fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    let mut h = seed;

    // Number of full 32-bit blocks of 4 bytes.
    // Possible exclusion of a remainder of up to 3 bytes.
    let blocks = data.len() >> 2;

    // Process the 32-bit blocks (the body) into the hash
    for i in 0..blocks {
        let lo = i << 2;
        let mut k = LE::read_u32(&data[lo..lo + 4]);
        k = k.wrapping_mul(C1);
        k = k.rotate_left(15);
        k = k.wrapping_mul(C2);
        h ^= k;
        h = h.rotate_left(13);
        h = h.wrapping_mul(5).wrapping_add(0xe6546b64);
    }

    // tail
    let tail = &data[blocks << 2..];
    let mut k = 0u32;
    if tail.len() >= 3 {
        k ^= u32::from(tail[2]) << 16;
    }
    if tail.len() >= 2 {
        k ^= u32::from(tail[1]) << 8;
    }
    if !tail.is_empty() {
        k ^= u32::from(tail[0]);
        k = k.wrapping_mul(C1);
        k = k.rotate_left(15);
        k = k.wrapping_mul(C2);
        h ^= k;
    }

    h ^= data.len() as u32;
    fmix32(h)
}

/// Finalization mix: force all bits of a hash block to avalanche.
#[inline]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^ (h >> 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(murmur3_32(b"", 0), 0);
        assert_eq!(murmur3_32(b"", 1), 0x514e28b7);
        assert_eq!(murmur3_32(b"", 0xffffffff), 0x81f16f39);
    }

    #[test]
    fn test_remainder() {
        // remainder 3
        assert_eq!(murmur3_32(b"abc", 0), 0xb3dd93fa);

        // remainder 1
        assert_eq!(murmur3_32(b"hello", 0), 0x248bfa47);
        assert_eq!(murmur3_32(b"Hello, world!", 0), 0xc0363e43);

        // remainder 0, multiple blocks
        let key = "The quick brown fox jumps over the lazy dog";
        assert_eq!(murmur3_32(key.as_bytes(), 0), 0x2e4ff723);
    }

    #[test]
    fn test_seed_changes_hash() {
        let a = murmur3_32(b"apple", 0);
        let b = murmur3_32(b"apple", 9001);
        assert_ne!(a, b);
    }
}
