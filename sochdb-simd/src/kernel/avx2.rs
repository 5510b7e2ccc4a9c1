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

//! AVX2 block bodies (x86_64): four 64-bit lanes per 256-bit register.

use std::arch::x86_64::*;

use super::{VectorBody, scalar};
use crate::bitmap::BitOp;
use crate::compare::CmpOp;
use crate::hash::{FNV_OFFSET_BASIS, FNV_PRIME, PRIME64_1, PRIME64_2, PRIME64_3, PRIME64_4, PRIME64_5};

const LANES: usize = 4;
const ALL_LANES: u64 = 0b1111;
const BYTES: usize = 32;

pub(crate) struct Avx2;

impl VectorBody for Avx2 {
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
        unsafe { fnv1a_block(block, out) }
    }

    #[inline]
    unsafe fn xxhash64_i64(block: &[i64], out: &mut [u64]) {
        unsafe { xxhash64_block(block, out) }
    }

    #[inline]
    unsafe fn crc32_i64(block: &[i64], out: &mut [u32]) {
        // No CRC-32/IEEE instruction in AVX2; lanes go through crc32fast,
        // which picks its own PCLMULQDQ path.
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
#[target_feature(enable = "avx2")]
unsafe fn lane_mask(cmp: __m256i) -> u64 {
    unsafe { _mm256_movemask_pd(_mm256_castsi256_pd(cmp)) as u64 }
}

#[target_feature(enable = "avx2")]
unsafe fn cmp_i64_block(op: CmpOp, block: &[i64], threshold: i64) -> u64 {
    unsafe {
        debug_assert_eq!(block.len(), LANES);
        let v = _mm256_loadu_si256(block.as_ptr() as *const __m256i);
        let t = _mm256_set1_epi64x(threshold);

        // Only eq and signed gt exist; the other four are swaps or complements
        match op {
            CmpOp::Eq => lane_mask(_mm256_cmpeq_epi64(v, t)),
            CmpOp::Ne => lane_mask(_mm256_cmpeq_epi64(v, t)) ^ ALL_LANES,
            CmpOp::Gt => lane_mask(_mm256_cmpgt_epi64(v, t)),
            CmpOp::Lt => lane_mask(_mm256_cmpgt_epi64(t, v)),
            CmpOp::Ge => lane_mask(_mm256_cmpgt_epi64(t, v)) ^ ALL_LANES,
            CmpOp::Le => lane_mask(_mm256_cmpgt_epi64(v, t)) ^ ALL_LANES,
        }
    }
}

#[target_feature(enable = "avx2")]
unsafe fn cmp_f64_block(op: CmpOp, block: &[f64], threshold: f64) -> u64 {
    unsafe {
        debug_assert_eq!(block.len(), LANES);
        let v = _mm256_loadu_pd(block.as_ptr());
        let t = _mm256_set1_pd(threshold);

        // Ordered-quiet predicates are false on NaN; NEQ_UQ is true on NaN
        let cmp = match op {
            CmpOp::Eq => _mm256_cmp_pd::<_CMP_EQ_OQ>(v, t),
            CmpOp::Ne => _mm256_cmp_pd::<_CMP_NEQ_UQ>(v, t),
            CmpOp::Gt => _mm256_cmp_pd::<_CMP_GT_OQ>(v, t),
            CmpOp::Lt => _mm256_cmp_pd::<_CMP_LT_OQ>(v, t),
            CmpOp::Ge => _mm256_cmp_pd::<_CMP_GE_OQ>(v, t),
            CmpOp::Le => _mm256_cmp_pd::<_CMP_LE_OQ>(v, t),
        };
        _mm256_movemask_pd(cmp) as u64
    }
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn spill(v: __m256i) -> [i64; LANES] {
    unsafe {
        let mut lanes = [0i64; LANES];
        _mm256_storeu_si256(lanes.as_mut_ptr() as *mut __m256i, v);
        lanes
    }
}

#[target_feature(enable = "avx2")]
unsafe fn sum_i64_body(body: &[i64]) -> i64 {
    unsafe {
        debug_assert_eq!(body.len() % LANES, 0);
        let mut acc = _mm256_setzero_si256();
        for chunk in body.chunks_exact(LANES) {
            let v = _mm256_loadu_si256(chunk.as_ptr() as *const __m256i);
            acc = _mm256_add_epi64(acc, v);
        }
        spill(acc)
            .iter()
            .fold(0i64, |total, &lane| total.wrapping_add(lane))
    }
}

#[target_feature(enable = "avx2")]
unsafe fn min_i64_body(body: &[i64]) -> i64 {
    unsafe {
        debug_assert_eq!(body.len() % LANES, 0);
        let mut acc = _mm256_set1_epi64x(i64::MAX);
        for chunk in body.chunks_exact(LANES) {
            let v = _mm256_loadu_si256(chunk.as_ptr() as *const __m256i);
            let acc_gt = _mm256_cmpgt_epi64(acc, v);
            acc = _mm256_blendv_epi8(acc, v, acc_gt);
        }
        scalar::min_i64(&spill(acc))
    }
}

#[target_feature(enable = "avx2")]
unsafe fn max_i64_body(body: &[i64]) -> i64 {
    unsafe {
        debug_assert_eq!(body.len() % LANES, 0);
        let mut acc = _mm256_set1_epi64x(i64::MIN);
        for chunk in body.chunks_exact(LANES) {
            let v = _mm256_loadu_si256(chunk.as_ptr() as *const __m256i);
            let v_gt = _mm256_cmpgt_epi64(v, acc);
            acc = _mm256_blendv_epi8(acc, v, v_gt);
        }
        scalar::max_i64(&spill(acc))
    }
}

#[target_feature(enable = "avx2")]
unsafe fn bitwise_assign_block(op: BitOp, acc: &mut [u64], other: &[u64]) {
    unsafe {
        debug_assert!(acc.len() == LANES && other.len() == LANES);
        let a = _mm256_loadu_si256(acc.as_ptr() as *const __m256i);
        let b = _mm256_loadu_si256(other.as_ptr() as *const __m256i);
        let r = match op {
            BitOp::And => _mm256_and_si256(a, b),
            BitOp::Or => _mm256_or_si256(a, b),
            BitOp::Xor => _mm256_xor_si256(a, b),
        };
        _mm256_storeu_si256(acc.as_mut_ptr() as *mut __m256i, r);
    }
}

#[target_feature(enable = "avx2")]
unsafe fn not_assign_block(acc: &mut [u64]) {
    unsafe {
        debug_assert_eq!(acc.len(), LANES);
        let a = _mm256_loadu_si256(acc.as_ptr() as *const __m256i);
        let ones = _mm256_set1_epi64x(-1);
        _mm256_storeu_si256(acc.as_mut_ptr() as *mut __m256i, _mm256_xor_si256(a, ones));
    }
}

/// Nibble-table popcount, summed per lane with SAD
#[target_feature(enable = "avx2")]
unsafe fn popcount_block(block: &[u64]) -> u64 {
    unsafe {
        debug_assert_eq!(block.len(), LANES);
        let v = _mm256_loadu_si256(block.as_ptr() as *const __m256i);
        let lookup = _mm256_setr_epi8(
            0, 1, 1, 2, 1, 2, 2, 3, 1, 2, 2, 3, 2, 3, 3, 4, //
            0, 1, 1, 2, 1, 2, 2, 3, 1, 2, 2, 3, 2, 3, 3, 4,
        );
        let low_nibbles = _mm256_set1_epi8(0x0f);
        let lo = _mm256_and_si256(v, low_nibbles);
        let hi = _mm256_and_si256(_mm256_srli_epi16::<4>(v), low_nibbles);
        let counts = _mm256_add_epi8(
            _mm256_shuffle_epi8(lookup, lo),
            _mm256_shuffle_epi8(lookup, hi),
        );
        let sums = _mm256_sad_epu8(counts, _mm256_setzero_si256());
        spill(sums).iter().map(|&s| s as u64).sum()
    }
}

/// Low 64 bits of a lane-wise 64x64 product, built from 32x32 partials
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn mullo_epi64(a: __m256i, b: __m256i) -> __m256i {
    unsafe {
        let a_hi = _mm256_srli_epi64::<32>(a);
        let b_hi = _mm256_srli_epi64::<32>(b);
        let lo_lo = _mm256_mul_epu32(a, b);
        let cross = _mm256_add_epi64(_mm256_mul_epu32(a_hi, b), _mm256_mul_epu32(a, b_hi));
        _mm256_add_epi64(lo_lo, _mm256_slli_epi64::<32>(cross))
    }
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn rotl_epi64<const R: i64>(x: __m256i) -> __m256i {
    unsafe {
        let left = _mm256_sllv_epi64(x, _mm256_set1_epi64x(R));
        let right = _mm256_srlv_epi64(x, _mm256_set1_epi64x(64 - R));
        _mm256_or_si256(left, right)
    }
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn splat(value: u64) -> __m256i {
    unsafe { _mm256_set1_epi64x(value as i64) }
}

#[target_feature(enable = "avx2")]
unsafe fn fnv1a_block(block: &[i64], out: &mut [u64]) {
    unsafe {
        debug_assert!(block.len() == LANES && out.len() == LANES);
        let mut bytes = _mm256_loadu_si256(block.as_ptr() as *const __m256i);
        let mut hash = splat(FNV_OFFSET_BASIS);
        let prime = splat(FNV_PRIME);
        let low_byte = _mm256_set1_epi64x(0xff);

        // Little-endian byte order: lowest byte first
        for _ in 0..8 {
            hash = _mm256_xor_si256(hash, _mm256_and_si256(bytes, low_byte));
            hash = mullo_epi64(hash, prime);
            bytes = _mm256_srli_epi64::<8>(bytes);
        }
        _mm256_storeu_si256(out.as_mut_ptr() as *mut __m256i, hash);
    }
}

#[target_feature(enable = "avx2")]
unsafe fn xxhash64_block(block: &[i64], out: &mut [u64]) {
    unsafe {
        debug_assert!(block.len() == LANES && out.len() == LANES);
        let v = _mm256_loadu_si256(block.as_ptr() as *const __m256i);
        let p1 = splat(PRIME64_1);
        let p2 = splat(PRIME64_2);
        let p3 = splat(PRIME64_3);

        let mut k1 = mullo_epi64(v, p2);
        k1 = rotl_epi64::<31>(k1);
        k1 = mullo_epi64(k1, p1);

        let mut h = _mm256_xor_si256(splat(PRIME64_5.wrapping_add(8)), k1);
        h = rotl_epi64::<27>(h);
        h = _mm256_add_epi64(mullo_epi64(h, p1), splat(PRIME64_4));

        h = _mm256_xor_si256(h, _mm256_srli_epi64::<33>(h));
        h = mullo_epi64(h, p2);
        h = _mm256_xor_si256(h, _mm256_srli_epi64::<29>(h));
        h = mullo_epi64(h, p3);
        h = _mm256_xor_si256(h, _mm256_srli_epi64::<32>(h));

        _mm256_storeu_si256(out.as_mut_ptr() as *mut __m256i, h);
    }
}

#[target_feature(enable = "avx2")]
unsafe fn bytes_eq_body(a: &[u8], b: &[u8]) -> bool {
    unsafe {
        let chunks = a.len() / BYTES;
        for i in 0..chunks {
            let offset = i * BYTES;
            let eq = {
                let va = _mm256_loadu_si256(a.as_ptr().add(offset) as *const __m256i);
                let vb = _mm256_loadu_si256(b.as_ptr().add(offset) as *const __m256i);
                _mm256_cmpeq_epi8(va, vb)
            };
            if _mm256_movemask_epi8(eq) != -1 {
                return false;
            }
        }
        scalar::bytes_eq(&a[chunks * BYTES..], &b[chunks * BYTES..])
    }
}

/// Flip bit 5 of every byte in `[first, last]`, 32 bytes at a time
#[target_feature(enable = "avx2")]
unsafe fn shift_case(buf: &mut [u8], first: u8, last: u8, to_lower: bool) {
    unsafe {
        let chunks = buf.len() / BYTES;
        // Signed compares: bytes >= 0x80 are negative and never in range
        let below = _mm256_set1_epi8((first - 1) as i8);
        let above = _mm256_set1_epi8((last + 1) as i8);
        let case_bit = _mm256_set1_epi8(0x20);

        for i in 0..chunks {
            let ptr = buf.as_mut_ptr().add(i * BYTES) as *mut __m256i;
            let v = _mm256_loadu_si256(ptr);
            let in_range = _mm256_and_si256(_mm256_cmpgt_epi8(v, below), _mm256_cmpgt_epi8(above, v));
            _mm256_storeu_si256(ptr, _mm256_xor_si256(v, _mm256_and_si256(in_range, case_bit)));
        }

        let tail = &mut buf[chunks * BYTES..];
        if to_lower {
            tail.make_ascii_lowercase();
        } else {
            tail.make_ascii_uppercase();
        }
    }
}
