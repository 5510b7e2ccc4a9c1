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

//! NEON block bodies (aarch64): two 64-bit lanes per 128-bit register.

use std::arch::aarch64::*;

use super::{VectorBody, scalar};
use crate::bitmap::BitOp;
use crate::compare::CmpOp;

const LANES: usize = 2;
const ALL_LANES: u64 = 0b11;
const BYTES: usize = 16;

pub(crate) struct Neon;

impl VectorBody for Neon {
    const LANES: usize = LANES;

    #[inline]
    unsafe fn cmp_i64(op: CmpOp, block: &[i64], threshold: i64) -> u64 {
        unsafe { cmp_i64_block(op, block, threshold) }
    }

    #[inline]
    unsafe fn cmp_f64(op: CmpOp, block: &[f64], threshold: f64) -> u64 {
        unsafe { cmp_f64_block(op, block, threshold) }
    }

    #[inline]
    unsafe fn sum_i64(body: &[i64]) -> i64 {
        unsafe { sum_i64_body(body) }
    }

    #[inline]
    unsafe fn min_i64(body: &[i64]) -> i64 {
        unsafe { min_i64_body(body) }
    }

    #[inline]
    unsafe fn max_i64(body: &[i64]) -> i64 {
        unsafe { max_i64_body(body) }
    }

    #[inline]
    unsafe fn bitwise_assign(op: BitOp, acc: &mut [u64], other: &[u64]) {
        unsafe { bitwise_assign_block(op, acc, other) }
    }

    #[inline]
    unsafe fn not_assign(acc: &mut [u64]) {
        unsafe { not_assign_block(acc) }
    }

    #[inline]
    unsafe fn popcount(block: &[u64]) -> u64 {
        unsafe { popcount_block(block) }
    }

    #[inline]
    unsafe fn fnv1a_i64(block: &[i64], out: &mut [u64]) {
        // No 64-bit lane multiply in NEON
        for (v, slot) in block.iter().zip(out.iter_mut()) {
            *slot = scalar::fnv1a_i64(*v);
        }
    }

    #[inline]
    unsafe fn xxhash64_i64(block: &[i64], out: &mut [u64]) {
        for (v, slot) in block.iter().zip(out.iter_mut()) {
            *slot = scalar::xxhash64_i64(*v);
        }
    }

    #[inline]
    unsafe fn crc32_i64(block: &[i64], out: &mut [u32]) {
        for (v, slot) in block.iter().zip(out.iter_mut()) {
            *slot = scalar::crc32_i64(*v);
        }
    }

    #[inline]
    unsafe fn bytes_eq(a: &[u8], b: &[u8]) -> bool {
        if a.len() != b.len() {
            return false;
        }
        unsafe { bytes_eq_body(a, b) }
    }

    #[inline]
    unsafe fn to_lower_ascii(buf: &mut [u8]) {
        unsafe { shift_case(buf, b'A', b'Z', true) }
    }

    #[inline]
    unsafe fn to_upper_ascii(buf: &mut [u8]) {
        unsafe { shift_case(buf, b'a', b'z', false) }
    }
}

#[inline]
#[target_feature(enable = "neon")]
unsafe fn lane_mask(cmp: uint64x2_t) -> u64 {
    unsafe {
        let lo = (vgetq_lane_u64(cmp, 0) != 0) as u64;
        let hi = (vgetq_lane_u64(cmp, 1) != 0) as u64;
        lo | (hi << 1)
    }
}

#[target_feature(enable = "neon")]
unsafe fn cmp_i64_block(op: CmpOp, block: &[i64], threshold: i64) -> u64 {
    unsafe {
        debug_assert_eq!(block.len(), LANES);
        let v = vld1q_s64(block.as_ptr());
        let t = vdupq_n_s64(threshold);

        match op {
            CmpOp::Eq => lane_mask(vceqq_s64(v, t)),
            CmpOp::Ne => lane_mask(vceqq_s64(v, t)) ^ ALL_LANES,
            CmpOp::Gt => lane_mask(vcgtq_s64(v, t)),
            CmpOp::Lt => lane_mask(vcltq_s64(v, t)),
            CmpOp::Ge => lane_mask(vcgeq_s64(v, t)),
            CmpOp::Le => lane_mask(vcleq_s64(v, t)),
        }
    }
}

/// Ordered compares are false on NaN; `Ne` negates `vceqq`, so NaN is true
#[target_feature(enable = "neon")]
unsafe fn cmp_f64_block(op: CmpOp, block: &[f64], threshold: f64) -> u64 {
    unsafe {
        debug_assert_eq!(block.len(), LANES);
        let v = vld1q_f64(block.as_ptr());
        let t = vdupq_n_f64(threshold);

        match op {
            CmpOp::Eq => lane_mask(vceqq_f64(v, t)),
            CmpOp::Ne => lane_mask(vceqq_f64(v, t)) ^ ALL_LANES,
            CmpOp::Gt => lane_mask(vcgtq_f64(v, t)),
            CmpOp::Lt => lane_mask(vcltq_f64(v, t)),
            CmpOp::Ge => lane_mask(vcgeq_f64(v, t)),
            CmpOp::Le => lane_mask(vcleq_f64(v, t)),
        }
    }
}

#[target_feature(enable = "neon")]
unsafe fn sum_i64_body(body: &[i64]) -> i64 {
    unsafe {
        debug_assert_eq!(body.len() % LANES, 0);
        let mut acc = vdupq_n_s64(0);
        for chunk in body.chunks_exact(LANES) {
            acc = vaddq_s64(acc, vld1q_s64(chunk.as_ptr()));
        }
        vgetq_lane_s64(acc, 0).wrapping_add(vgetq_lane_s64(acc, 1))
    }
}

#[target_feature(enable = "neon")]
unsafe fn min_i64_body(body: &[i64]) -> i64 {
    unsafe {
        debug_assert_eq!(body.len() % LANES, 0);
        let mut acc = vdupq_n_s64(i64::MAX);
        for chunk in body.chunks_exact(LANES) {
            let v = vld1q_s64(chunk.as_ptr());
            acc = vbslq_s64(vcgtq_s64(acc, v), v, acc);
        }
        vgetq_lane_s64(acc, 0).min(vgetq_lane_s64(acc, 1))
    }
}

#[target_feature(enable = "neon")]
unsafe fn max_i64_body(body: &[i64]) -> i64 {
    unsafe {
        debug_assert_eq!(body.len() % LANES, 0);
        let mut acc = vdupq_n_s64(i64::MIN);
        for chunk in body.chunks_exact(LANES) {
            let v = vld1q_s64(chunk.as_ptr());
            acc = vbslq_s64(vcgtq_s64(v, acc), v, acc);
        }
        vgetq_lane_s64(acc, 0).max(vgetq_lane_s64(acc, 1))
    }
}

#[target_feature(enable = "neon")]
unsafe fn bitwise_assign_block(op: BitOp, acc: &mut [u64], other: &[u64]) {
    unsafe {
        debug_assert!(acc.len() == LANES && other.len() == LANES);
        let a = vld1q_u64(acc.as_ptr());
        let b = vld1q_u64(other.as_ptr());
        let r = match op {
            BitOp::And => vandq_u64(a, b),
            BitOp::Or => vorrq_u64(a, b),
            BitOp::Xor => veorq_u64(a, b),
        };
        vst1q_u64(acc.as_mut_ptr(), r);
    }
}

#[target_feature(enable = "neon")]
unsafe fn not_assign_block(acc: &mut [u64]) {
    unsafe {
        debug_assert_eq!(acc.len(), LANES);
        let a = vld1q_u64(acc.as_ptr());
        vst1q_u64(acc.as_mut_ptr(), veorq_u64(a, vdupq_n_u64(u64::MAX)));
    }
}

#[target_feature(enable = "neon")]
unsafe fn popcount_block(block: &[u64]) -> u64 {
    unsafe {
        debug_assert_eq!(block.len(), LANES);
        let bytes = vld1q_u8(block.as_ptr() as *const u8);
        vaddlvq_u8(vcntq_u8(bytes)) as u64
    }
}

#[target_feature(enable = "neon")]
unsafe fn bytes_eq_body(a: &[u8], b: &[u8]) -> bool {
    unsafe {
        let chunks = a.len() / BYTES;
        for i in 0..chunks {
            let offset = i * BYTES;
            let va = vld1q_u8(a.as_ptr().add(offset));
            let vb = vld1q_u8(b.as_ptr().add(offset));
            if vminvq_u8(vceqq_u8(va, vb)) != u8::MAX {
                return false;
            }
        }
        scalar::bytes_eq(&a[chunks * BYTES..], &b[chunks * BYTES..])
    }
}

/// Flip bit 5 of every byte in `[first, last]`, 16 bytes at a time
#[target_feature(enable = "neon")]
unsafe fn shift_case(buf: &mut [u8], first: u8, last: u8, to_lower: bool) {
    unsafe {
        let chunks = buf.len() / BYTES;
        let lo = vdupq_n_u8(first);
        let hi = vdupq_n_u8(last);
        let case_bit = vdupq_n_u8(0x20);

        for i in 0..chunks {
            let ptr = buf.as_mut_ptr().add(i * BYTES);
            let v = vld1q_u8(ptr);
            let in_range = vandq_u8(vcgeq_u8(v, lo), vcleq_u8(v, hi));
            vst1q_u8(ptr, veorq_u8(v, vandq_u8(in_range, case_bit)));
        }

        let tail = &mut buf[chunks * BYTES..];
        if to_lower {
            tail.make_ascii_lowercase();
        } else {
            tail.make_ascii_uppercase();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_cmp_blocks_match_scalar() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let block: Vec<i64> = (0..LANES).map(|_| rng.gen_range(-4..4)).collect();
            let threshold = rng.gen_range(-4..4);
            for op in CmpOp::ALL {
                let expected = scalar::cmp_i64_mask(&block, op, threshold)[0];
                let got = unsafe { Neon::cmp_i64(op, &block, threshold) };
                assert_eq!(got, expected, "{op:?} {block:?} {threshold}");
            }
        }
    }

    #[test]
    fn test_cmp_f64_nan_lanes() {
        for block in [[f64::NAN, 1.0], [2.0, f64::NAN]] {
            for op in CmpOp::ALL {
                for threshold in [1.0, f64::NAN] {
                    let expected = scalar::cmp_f64_mask(&block, op, threshold)[0];
                    let got = unsafe { Neon::cmp_f64(op, &block, threshold) };
                    assert_eq!(got, expected, "{op:?} threshold {threshold}");
                }
            }
        }
    }

    #[test]
    fn test_reductions_match_scalar() {
        let mut rng = StdRng::seed_from_u64(11);
        for n in [0usize, 2, 8, 64, 1024] {
            let body: Vec<i64> = (0..n).map(|_| rng.r#gen()).collect();
            unsafe {
                assert_eq!(Neon::sum_i64(&body), scalar::sum_i64(&body));
                assert_eq!(Neon::min_i64(&body), scalar::min_i64(&body));
                assert_eq!(Neon::max_i64(&body), scalar::max_i64(&body));
            }
        }
    }

    #[test]
    fn test_word_blocks_match_scalar() {
        let a = [0xdead_beef_0000_ffffu64, u64::MAX];
        let b = [0x0f0f_0f0f_f0f0_f0f0u64, 1];
        for op in [BitOp::And, BitOp::Or, BitOp::Xor] {
            let mut acc = a;
            unsafe { Neon::bitwise_assign(op, &mut acc, &b) };
            assert_eq!(acc, [scalar::bitwise(op, a[0], b[0]), scalar::bitwise(op, a[1], b[1])]);
        }
        let mut acc = a;
        unsafe { Neon::not_assign(&mut acc) };
        assert_eq!(acc, [!a[0], !a[1]]);
        assert_eq!(unsafe { Neon::popcount(&a) }, scalar::popcount(&a));
    }

    #[test]
    fn test_byte_helpers() {
        let a: Vec<u8> = (0..50u8).collect();
        let mut b = a.clone();
        assert!(unsafe { Neon::bytes_eq(&a, &b) });
        b[17] ^= 1;
        assert!(!unsafe { Neon::bytes_eq(&a, &b) });

        let text = b"Hello, WORLD! Mixed-Case ASCII \xc3\x89 @[`{".to_vec();
        let mut lower = text.clone();
        unsafe { Neon::to_lower_ascii(&mut lower) };
        assert_eq!(lower, text.to_ascii_lowercase());
    }
}
