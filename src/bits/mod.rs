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

//! Packed bit arrays and fixed-width counter arrays.
//!
//! These are the backing stores of the filter families: [`BitArray`] for
//! the plain Bloom filter, [`CountingBitArray`] for the counting variant.
//! Counter cells are generic over [`Counter`], which is implemented for
//! `u8`/`u16`/`u32`/`u64` and for the nibble-width [`U4`].

mod array;
mod counting;

pub use self::array::BitArray;
pub use self::counting::Counter;
pub use self::counting::CountingBitArray;
pub use self::counting::U4;
