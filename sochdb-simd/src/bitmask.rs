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

//! Packed boolean bitmasks
//!
//! One bit per logical element: element `i` lives in word `i / 64`, bit
//! `i % 64`, least-significant bit first. A mask over `N` elements is always
//! exactly `ceil(N / 64)` words; bits past `N` in the last word are zero
//! when produced by a kernel.

/// Bit-packed boolean sequence, 64 elements per word
pub type Bitmask = Vec<u64>;

/// Number of words needed for `num_rows` elements
#[inline]
pub const fn words_for(num_rows: usize) -> usize {
    num_rows.div_ceil(64)
}

/// Allocate an all-zero bitmask for `num_rows` elements
#[inline]
pub fn allocate_bitmap(num_rows: usize) -> Bitmask {
    vec![0u64; words_for(num_rows)]
}

/// Set a bit in the bitmask
#[inline]
pub fn set_bit(bitmap: &mut [u64], idx: usize) {
    let word_idx = idx / 64;
    let bit_idx = idx % 64;
    if word_idx < bitmap.len() {
        bitmap[word_idx] |= 1u64 << bit_idx;
    }
}

/// Check if a bit is set; out-of-range indices read as unset
#[inline]
pub fn get_bit(bitmap: &[u64], idx: usize) -> bool {
    let word_idx = idx / 64;
    let bit_idx = idx % 64;
    if word_idx < bitmap.len() {
        (bitmap[word_idx] >> bit_idx) & 1 == 1
    } else {
        false
    }
}

/// Write the lane mask of one block whose first element is `start`.
///
/// Lane `L` goes to absolute bit `start + L`. Blocks are placed lane by lane
/// because a block may straddle a word boundary.
#[inline]
pub(crate) fn write_lanes(bitmap: &mut [u64], start: usize, lane_mask: u64, lanes: usize) {
    for lane in 0..lanes {
        if (lane_mask >> lane) & 1 == 1 {
            set_bit(bitmap, start + lane);
        }
    }
}

/// Pack a boolean slice
pub fn pack_bools(bools: &[bool]) -> Bitmask {
    let mut bitmap = allocate_bitmap(bools.len());
    for (word, chunk) in bitmap.iter_mut().zip(bools.chunks(64)) {
        for (bit, &b) in chunk.iter().enumerate() {
            if b {
                *word |= 1u64 << bit;
            }
        }
    }
    bitmap
}

/// Unpack the first `len` elements of a bitmask.
///
/// Positions beyond the supplied words read as `false`.
pub fn unpack_bools(bitmap: &[u64], len: usize) -> Vec<bool> {
    (0..len).map(|idx| get_bit(bitmap, idx)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_for() {
        assert_eq!(words_for(0), 0);
        assert_eq!(words_for(1), 1);
        assert_eq!(words_for(64), 1);
        assert_eq!(words_for(65), 2);
        assert_eq!(words_for(128), 2);
        assert_eq!(allocate_bitmap(129).len(), 3);
    }

    #[test]
    fn test_set_get() {
        let mut bitmap = allocate_bitmap(130);
        for idx in [0, 1, 63, 64, 127, 129] {
            set_bit(&mut bitmap, idx);
        }
        assert_eq!(bitmap[0], 1 | 2 | (1 << 63));
        assert_eq!(bitmap[1], 1 | (1 << 63));
        assert_eq!(bitmap[2], 2);
        assert!(get_bit(&bitmap, 129));
        assert!(!get_bit(&bitmap, 128));
        assert!(!get_bit(&bitmap, 10_000));
        // Out of range writes are ignored
        set_bit(&mut bitmap, 10_000);
        assert_eq!(bitmap.len(), 3);
    }

    #[test]
    fn test_write_lanes_straddles_word_boundary() {
        let mut bitmap = allocate_bitmap(70);
        // Block of 4 starting at 62 covers bits 62, 63, 64, 65
        write_lanes(&mut bitmap, 62, 0b1011, 4);
        assert!(get_bit(&bitmap, 62));
        assert!(get_bit(&bitmap, 63));
        assert!(!get_bit(&bitmap, 64));
        assert!(get_bit(&bitmap, 65));
        assert_eq!(bitmap, vec![0b11u64 << 62, 0b10]);
    }

    #[test]
    fn test_pack_layout() {
        let mut bools = vec![false; 70];
        bools[0] = true;
        bools[5] = true;
        bools[64] = true;
        let mask = pack_bools(&bools);
        assert_eq!(mask, vec![0b100001, 1]);
    }

    #[test]
    fn test_round_trip_non_multiple_of_64() {
        for len in [0usize, 1, 3, 63, 64, 65, 100, 191, 256] {
            let bools: Vec<bool> = (0..len).map(|i| i % 3 == 0 || i % 7 == 1).collect();
            let mask = pack_bools(&bools);
            assert_eq!(mask.len(), words_for(len));
            assert_eq!(unpack_bools(&mask, len), bools, "len {len}");
        }
    }

    #[test]
    fn test_unpack_past_end() {
        assert_eq!(unpack_bools(&[u64::MAX], 66)[64..], [false, false]);
        assert!(unpack_bools(&[], 3).iter().all(|b| !b));
    }
}
