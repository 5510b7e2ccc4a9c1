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

//! Column aggregates over `i64`.
//!
//! | Aggregate | Empty input | Overflow |
//! |-----------|-------------|----------|
//! | `sum_i64` | `0` | wraps (two's complement) |
//! | `min_i64` | `i64::MAX` | - |
//! | `max_i64` | `i64::MIN` | - |
//! | `avg_i64` | `0.0` | wrapping sum / count |
//! | `count_non_null` | `0` | - |

use crate::dispatch::Dispatcher;
use crate::kernel::{VectorBody, reduce_blocks, scalar, with_vector_body};

/// # Safety
///
/// The CPU must support `K`.
unsafe fn sum_blocks<K: VectorBody>(values: &[i64]) -> i64 {
    reduce_blocks(
        values,
        K::LANES,
        |body| unsafe { K::sum_i64(body) },
        |acc, v| acc.wrapping_add(v),
    )
}

/// # Safety
///
/// The CPU must support `K`.
unsafe fn min_blocks<K: VectorBody>(values: &[i64]) -> i64 {
    reduce_blocks(values, K::LANES, |body| unsafe { K::min_i64(body) }, i64::min)
}

/// # Safety
///
/// The CPU must support `K`.
unsafe fn max_blocks<K: VectorBody>(values: &[i64]) -> i64 {
    reduce_blocks(values, K::LANES, |body| unsafe { K::max_i64(body) }, i64::max)
}

impl Dispatcher {
    /// Wrapping sum, `0` on empty input
    pub fn sum_i64(&self, values: &[i64]) -> i64 {
        if values.is_empty() {
            return 0;
        }
        with_vector_body!(self.numeric_variant(values.len()),
            K => sum_blocks::<K>(values),
            _ => scalar::sum_i64(values),
        )
    }

    /// Minimum, `i64::MAX` on empty input
    pub fn min_i64(&self, values: &[i64]) -> i64 {
        if values.is_empty() {
            return i64::MAX;
        }
        with_vector_body!(self.numeric_variant(values.len()),
            K => min_blocks::<K>(values),
            _ => scalar::min_i64(values),
        )
    }

    /// Maximum, `i64::MIN` on empty input
    pub fn max_i64(&self, values: &[i64]) -> i64 {
        if values.is_empty() {
            return i64::MIN;
        }
        with_vector_body!(self.numeric_variant(values.len()),
            K => max_blocks::<K>(values),
            _ => scalar::max_i64(values),
        )
    }

    /// Rows whose null bit is clear.
    ///
    /// A set bit in `null_mask` marks a null row. Rows past the end of the
    /// mask count as non-null, and `None` counts every row. Whole mask words
    /// go through the popcount kernel; only the partial last word is masked.
    pub fn count_non_null(&self, values: &[i64], null_mask: Option<&[u64]>) -> usize {
        let Some(mask) = null_mask else {
            return values.len();
        };
        let len = values.len();
        if len == 0 {
            return 0;
        }

        let full_words = (len / 64).min(mask.len());
        let mut nulls = self.popcount(&mask[..full_words]) as usize;

        let tail_bits = len % 64;
        if let (true, Some(&last)) = (tail_bits > 0, mask.get(full_words)) {
            nulls += (last & ((1u64 << tail_bits) - 1)).count_ones() as usize;
        }
        len - nulls
    }

    /// Wrapping sum divided by the row count, `0.0` on empty input
    pub fn avg_i64(&self, values: &[i64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        self.sum_i64(values) as f64 / values.len() as f64
    }
}

pub fn sum_i64(values: &[i64]) -> i64 {
    Dispatcher::detect().sum_i64(values)
}

pub fn min_i64(values: &[i64]) -> i64 {
    Dispatcher::detect().min_i64(values)
}

pub fn max_i64(values: &[i64]) -> i64 {
    Dispatcher::detect().max_i64(values)
}

pub fn count_non_null(values: &[i64], null_mask: Option<&[u64]>) -> usize {
    Dispatcher::detect().count_non_null(values, null_mask)
}

pub fn avg_i64(values: &[i64]) -> f64 {
    Dispatcher::detect().avg_i64(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmask::{allocate_bitmap, get_bit, set_bit};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_empty_sentinels() {
        for d in [Dispatcher::vector(), Dispatcher::scalar(), Dispatcher::detect()] {
            assert_eq!(d.sum_i64(&[]), 0);
            assert_eq!(d.min_i64(&[]), i64::MAX);
            assert_eq!(d.max_i64(&[]), i64::MIN);
            assert_eq!(d.avg_i64(&[]), 0.0);
            assert_eq!(d.count_non_null(&[], None), 0);
        }
    }

    #[test]
    fn test_basic_aggregates() {
        let data: Vec<i64> = (1..=100).collect();
        assert_eq!(sum_i64(&data), 5050);
        assert_eq!(min_i64(&data), 1);
        assert_eq!(max_i64(&data), 100);
        assert_eq!(avg_i64(&data), 50.5);
    }

    #[test]
    fn test_sum_wraps() {
        let data = [i64::MAX, 1, 0, 0, 0];
        for d in [Dispatcher::vector(), Dispatcher::scalar()] {
            assert_eq!(d.sum_i64(&data), i64::MIN);
        }
    }

    #[test]
    fn test_min_max_in_remainder() {
        // Extremes sit in the tail that never reaches a vector block
        let data = [5i64, 6, 7, 8, 9, -40, 90];
        for d in [Dispatcher::vector(), Dispatcher::scalar()] {
            assert_eq!(d.min_i64(&data), -40);
            assert_eq!(d.max_i64(&data), 90);
        }
    }

    #[test]
    fn test_count_non_null() {
        let values = vec![0i64; 130];
        let mut mask = allocate_bitmap(130);
        for i in [0, 3, 63, 64, 65, 129] {
            set_bit(&mut mask, i);
        }
        for d in [Dispatcher::vector(), Dispatcher::scalar()] {
            assert_eq!(d.count_non_null(&values, Some(&mask)), 124);
            assert_eq!(d.count_non_null(&values, None), 130);
        }
    }

    #[test]
    fn test_count_non_null_ignores_bits_past_len() {
        // Stray bits beyond the last row must not count as nulls
        let values = vec![0i64; 70];
        let mask = vec![0b1u64, u64::MAX, u64::MAX];
        for d in [Dispatcher::vector(), Dispatcher::scalar()] {
            assert_eq!(d.count_non_null(&values, Some(&mask)), 70 - 1 - 6);
        }
    }

    #[test]
    fn test_count_non_null_matches_bitwise_count() {
        let mut rng = StdRng::seed_from_u64(23);
        for len in [1usize, 63, 64, 65, 255, 256, 257, 1_000] {
            let values = vec![0i64; len];
            let mask: Vec<u64> = (0..len.div_ceil(64)).map(|_| rng.r#gen()).collect();
            let expected = (0..len).filter(|&i| !get_bit(&mask, i)).count();
            for d in [Dispatcher::vector(), Dispatcher::scalar()] {
                assert_eq!(d.count_non_null(&values, Some(&mask)), expected, "len {len}");
                assert_eq!(
                    d.count_non_null(&values, Some(&mask[..mask.len() / 2])),
                    (0..len)
                        .filter(|&i| i >= (mask.len() / 2) * 64 || !get_bit(&mask, i))
                        .count(),
                    "len {len}, half mask"
                );
            }
        }
    }

    #[test]
    fn test_count_non_null_short_mask() {
        // One word covers rows 0-63; rows 64.. have no mask word
        let values = vec![1i64; 100];
        let mask = vec![u64::MAX];
        for d in [Dispatcher::vector(), Dispatcher::scalar()] {
            assert_eq!(d.count_non_null(&values, Some(&mask)), 36);
        }
    }
}
