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

//! Vector Kernel Contract
//!
//! Every fixed-width kernel follows the same shape:
//!
//! ```text
//! values: [ b0 b0 b0 b0 | b1 b1 b1 b1 | ... | bk bk bk bk | r r ]
//!           └─ block ─┘                                    └ remainder (scalar)
//! ```
//!
//! 1. The body (`len - len % B` elements) is processed `B` lanes at a time
//!    by a [`VectorBody`]. Predicate blocks return a `B`-bit lane mask;
//!    reductions fold into a vector accumulator.
//! 2. The remainder runs through the scalar algorithm of the same operation.
//! 3. Lane `L` of a block starting at element `i` is packed at absolute bit
//!    `i + L`, lane by lane, so blocks may straddle word boundaries.
//! 4. Reductions start from the operation's identity, so an empty body
//!    contributes nothing.
//!
//! Correctness of a kernel is therefore correctness of its scalar algorithm
//! plus block/scalar equivalence of the body, which is unit-tested for each
//! [`VectorBody`] against [`scalar`].

pub(crate) mod scalar;

#[cfg(target_arch = "x86_64")]
pub(crate) mod avx2;

#[cfg(target_arch = "aarch64")]
pub(crate) mod neon;

use crate::bitmap::BitOp;
use crate::bitmask::{Bitmask, allocate_bitmap, set_bit, write_lanes};
use crate::compare::CmpOp;

/// Block bodies provided by one register class.
///
/// # Safety
///
/// Every method requires the CPU feature of the implementing type to be
/// available. Block methods additionally require `block.len() == LANES`;
/// body methods require `len % LANES == 0`.
pub(crate) trait VectorBody {
    /// 64-bit lanes per block
    const LANES: usize;

    /// Lane mask of `block[L] op threshold`
    unsafe fn cmp_i64(op: CmpOp, block: &[i64], threshold: i64) -> u64;

    /// Lane mask of `block[L] op threshold` with IEEE-754 NaN semantics
    unsafe fn cmp_f64(op: CmpOp, block: &[f64], threshold: f64) -> u64;

    /// Wrapping sum of a body
    unsafe fn sum_i64(body: &[i64]) -> i64;

    /// Minimum of a body, `i64::MAX` when empty
    unsafe fn min_i64(body: &[i64]) -> i64;

    /// Maximum of a body, `i64::MIN` when empty
    unsafe fn max_i64(body: &[i64]) -> i64;

    /// `acc[L] = acc[L] op other[L]` over one block of words
    unsafe fn bitwise_assign(op: BitOp, acc: &mut [u64], other: &[u64]);

    /// `acc[L] = !acc[L]` over one block of words
    unsafe fn not_assign(acc: &mut [u64]);

    /// Set bits in one block of words
    unsafe fn popcount(block: &[u64]) -> u64;

    /// FNV-1a of each lane
    unsafe fn fnv1a_i64(block: &[i64], out: &mut [u64]);

    /// XXH64 of each lane
    unsafe fn xxhash64_i64(block: &[i64], out: &mut [u64]);

    /// CRC-32 of each lane
    unsafe fn crc32_i64(block: &[i64], out: &mut [u32]);

    /// Byte equality of two slices of any length
    unsafe fn bytes_eq(a: &[u8], b: &[u8]) -> bool;

    /// ASCII lowercase in place
    unsafe fn to_lower_ascii(buf: &mut [u8]);

    /// ASCII uppercase in place
    unsafe fn to_upper_ascii(buf: &mut [u8]);
}

/// Run `$vector` with `$body` bound to the [`VectorBody`] of the selected
/// variant, or `$scalar` when the variant is scalar or not compiled in.
///
/// The variant must come from a [`crate::dispatch::Dispatcher`], whose
/// capability set only ever contains extensions the host supports.
macro_rules! with_vector_body {
    ($variant:expr, $body:ident => $vector:expr, _ => $scalar:expr $(,)?) => {
        match $variant {
            #[cfg(target_arch = "x86_64")]
            $crate::dispatch::KernelVariant::Avx2 => {
                type $body = $crate::kernel::avx2::Avx2;
                // SAFETY: the dispatcher only selects AVX2 when the host has it
                #[allow(unused_unsafe)]
                let result = unsafe { $vector };
                result
            }
            #[cfg(target_arch = "aarch64")]
            $crate::dispatch::KernelVariant::Neon => {
                type $body = $crate::kernel::neon::Neon;
                // SAFETY: the dispatcher only selects NEON when the host has it
                #[allow(unused_unsafe)]
                let result = unsafe { $vector };
                result
            }
            _ => $scalar,
        }
    };
}

pub(crate) use with_vector_body;

/// Predicate driver: blocks packed lane by lane, remainder scalar
pub(crate) fn pack_blocks<T: Copy>(
    values: &[T],
    lanes: usize,
    mut block: impl FnMut(&[T]) -> u64,
    scalar: impl Fn(T) -> bool,
) -> Bitmask {
    let mut bitmap = allocate_bitmap(values.len());
    if values.is_empty() {
        return bitmap;
    }

    let body_len = values.len() - values.len() % lanes;
    for (block_idx, chunk) in values[..body_len].chunks_exact(lanes).enumerate() {
        write_lanes(&mut bitmap, block_idx * lanes, block(chunk), lanes);
    }

    for (idx, &value) in values.iter().enumerate().skip(body_len) {
        if scalar(value) {
            set_bit(&mut bitmap, idx);
        }
    }
    bitmap
}

/// Reduction driver: vector body over whole blocks, scalar fold over the rest
pub(crate) fn reduce_blocks<T: Copy, A>(
    values: &[T],
    lanes: usize,
    body: impl FnOnce(&[T]) -> A,
    fold: impl Fn(A, T) -> A,
) -> A {
    let body_len = values.len() - values.len() % lanes;
    let acc = body(&values[..body_len]);
    values[body_len..]
        .iter()
        .fold(acc, |acc, &value| fold(acc, value))
}

/// Element-wise map driver writing into a caller-sized output
pub(crate) fn map_blocks<T: Copy, O>(
    values: &[T],
    out: &mut [O],
    lanes: usize,
    mut block: impl FnMut(&[T], &mut [O]),
    scalar: impl Fn(T) -> O,
) {
    debug_assert_eq!(values.len(), out.len());
    let body_len = values.len() - values.len() % lanes;
    for (chunk, out_chunk) in values[..body_len]
        .chunks_exact(lanes)
        .zip(out[..body_len].chunks_exact_mut(lanes))
    {
        block(chunk, out_chunk);
    }
    for (value, slot) in values[body_len..].iter().zip(out[body_len..].iter_mut()) {
        *slot = scalar(*value);
    }
}

/// In-place word driver for bitmap logic over the common prefix
pub(crate) fn zip_words_assign(
    acc: &mut [u64],
    other: &[u64],
    lanes: usize,
    mut block: impl FnMut(&mut [u64], &[u64]),
    scalar: impl Fn(u64, u64) -> u64,
) {
    let len = acc.len().min(other.len());
    let body_len = len - len % lanes;
    for (acc_chunk, other_chunk) in acc[..body_len]
        .chunks_exact_mut(lanes)
        .zip(other[..body_len].chunks_exact(lanes))
    {
        block(acc_chunk, other_chunk);
    }
    for (a, &b) in acc[body_len..len].iter_mut().zip(&other[body_len..len]) {
        *a = scalar(*a, b);
    }
}

/// Block-wise fold over words, remainder scalar
pub(crate) fn fold_word_blocks(
    words: &[u64],
    lanes: usize,
    mut block: impl FnMut(&[u64]) -> u64,
    scalar: impl Fn(u64) -> u64,
) -> u64 {
    let body_len = words.len() - words.len() % lanes;
    let body: u64 = words[..body_len].chunks_exact(lanes).map(&mut block).sum();
    body + words[body_len..].iter().map(|&w| scalar(w)).sum::<u64>()
}
