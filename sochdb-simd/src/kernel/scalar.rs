// SPDX-License-Identifier: AGPL-3.0-or-later
// SochDB - LLM-Optimized Embedded Database
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Scalar reference algorithms.
//!
//! Every vector body is checked against these, and every kernel finishes its
//! remainder with them.

use crate::bitmap::BitOp;
use crate::bitmask::{Bitmask, allocate_bitmap, set_bit};
use crate::compare::CmpOp;
use crate::hash::{FNV_OFFSET_BASIS, FNV_PRIME, PRIME64_1, PRIME64_2, PRIME64_3, PRIME64_4, PRIME64_5};

#[inline]
pub(crate) fn cmp_i64(op: CmpOp, value: i64, threshold: i64) -> bool {
    match op {
        CmpOp::Eq => value == threshold,
        CmpOp::Ne => value != threshold,
        CmpOp::Gt => value > threshold,
        CmpOp::Lt => value < threshold,
        CmpOp::Ge => value >= threshold,
        CmpOp::Le => value <= threshold,
    }
}

/// IEEE-754 operators: NaN on either side is false for everything but `Ne`
#[inline]
pub(crate) fn cmp_f64(op: CmpOp, value: f64, threshold: f64) -> bool {
    match op {
        CmpOp::Eq => value == threshold,
        CmpOp::Ne => value != threshold,
        CmpOp::Gt => value > threshold,
        CmpOp::Lt => value < threshold,
        CmpOp::Ge => value >= threshold,
        CmpOp::Le => value <= threshold,
    }
}

pub(crate) fn cmp_i64_mask(values: &[i64], op: CmpOp, threshold: i64) -> Bitmask {
    let mut bitmap = allocate_bitmap(values.len());
    for (i, &v) in values.iter().enumerate() {
        if cmp_i64(op, v, threshold) {
            set_bit(&mut bitmap, i);
        }
    }
    bitmap
}

pub(crate) fn cmp_f64_mask(values: &[f64], op: CmpOp, threshold: f64) -> Bitmask {
    let mut bitmap = allocate_bitmap(values.len());
    for (i, &v) in values.iter().enumerate() {
        if cmp_f64(op, v, threshold) {
            set_bit(&mut bitmap, i);
        }
    }
    bitmap
}

#[inline]
pub(crate) fn sum_i64(values: &[i64]) -> i64 {
    values.iter().fold(0i64, |acc, &v| acc.wrapping_add(v))
}

#[inline]
pub(crate) fn min_i64(values: &[i64]) -> i64 {
    values.iter().fold(i64::MAX, |acc, &v| acc.min(v))
}

#[inline]
pub(crate) fn max_i64(values: &[i64]) -> i64 {
    values.iter().fold(i64::MIN, |acc, &v| acc.max(v))
}

#[inline]
pub(crate) fn bitwise(op: BitOp, a: u64, b: u64) -> u64 {
    match op {
        BitOp::And => a & b,
        BitOp::Or => a | b,
        BitOp::Xor => a ^ b,
    }
}

#[inline]
pub(crate) fn popcount(words: &[u64]) -> u64 {
    words.iter().map(|w| w.count_ones() as u64).sum()
}

/// FNV-1a over the 8 little-endian bytes
#[inline]
pub(crate) fn fnv1a_i64(value: i64) -> u64 {
    value.to_le_bytes().iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
    })
}

/// XXH64 (seed 0) of the 8 little-endian bytes, the single-lane short path
#[inline]
pub(crate) fn xxhash64_i64(value: i64) -> u64 {
    let k1 = (value as u64)
        .wrapping_mul(PRIME64_2)
        .rotate_left(31)
        .wrapping_mul(PRIME64_1);
    let mut h = PRIME64_5.wrapping_add(8) ^ k1;
    h = h
        .rotate_left(27)
        .wrapping_mul(PRIME64_1)
        .wrapping_add(PRIME64_4);
    avalanche(h)
}

#[inline]
pub(crate) fn avalanche(mut h: u64) -> u64 {
    h ^= h >> 33;
    h = h.wrapping_mul(PRIME64_2);
    h ^= h >> 29;
    h = h.wrapping_mul(PRIME64_3);
    h ^= h >> 32;
    h
}

#[inline]
pub(crate) fn crc32_i64(value: i64) -> u32 {
    crc32fast::hash(&value.to_le_bytes())
}

#[inline]
pub(crate) fn bytes_eq(a: &[u8], b: &[u8]) -> bool {
    a == b
}

/// Substring test; the empty needle is contained in everything
pub(crate) fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    if needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::Hasher;
    use twox_hash::XxHash64;

    #[test]
    fn test_cmp_f64_nan() {
        for op in CmpOp::ALL {
            let expected = op == CmpOp::Ne;
            assert_eq!(cmp_f64(op, f64::NAN, 1.0), expected, "{op:?}");
            assert_eq!(cmp_f64(op, 1.0, f64::NAN), expected, "{op:?}");
        }
    }

    #[test]
    fn test_reduction_identities() {
        assert_eq!(sum_i64(&[]), 0);
        assert_eq!(min_i64(&[]), i64::MAX);
        assert_eq!(max_i64(&[]), i64::MIN);
        assert_eq!(sum_i64(&[i64::MAX, 1]), i64::MIN);
    }

    #[test]
    fn test_fnv1a_zero() {
        // Eight zero bytes
        let mut expected = FNV_OFFSET_BASIS;
        for _ in 0..8 {
            expected = expected.wrapping_mul(FNV_PRIME);
        }
        assert_eq!(fnv1a_i64(0), expected);
    }

    #[test]
    fn test_xxhash_matches_twox() {
        for v in [0i64, 1, -1, 42, i64::MIN, i64::MAX, 0x0123_4567_89ab_cdef] {
            let mut hasher = XxHash64::with_seed(0);
            hasher.write(&v.to_le_bytes());
            assert_eq!(xxhash64_i64(v), hasher.finish(), "value {v}");
        }
    }

    #[test]
    fn test_crc32_known_vector() {
        // CRC-32/IEEE of eight zero bytes
        assert_eq!(crc32_i64(0), 0x6522_DF69);
    }

    #[test]
    fn test_contains_edges() {
        assert!(contains(b"", b""));
        assert!(contains(b"abc", b""));
        assert!(!contains(b"", b"a"));
        assert!(contains(b"hello world", b"o w"));
        assert!(!contains(b"ab", b"abc"));
    }
}
