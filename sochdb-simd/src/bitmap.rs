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

//! Bitmap logic over packed masks.
//!
//! Binary operations produce `min(a.len(), b.len())` words; the in-place
//! forms touch only that common prefix of the accumulator.

use crate::bitmask::Bitmask;
use crate::dispatch::Dispatcher;
use crate::kernel::{VectorBody, fold_word_blocks, scalar, with_vector_body, zip_words_assign};

/// Binary word operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitOp {
    And,
    Or,
    Xor,
}

/// # Safety
///
/// The CPU must support `K`.
unsafe fn bitwise_assign_blocks<K: VectorBody>(op: BitOp, acc: &mut [u64], other: &[u64]) {
    zip_words_assign(
        acc,
        other,
        K::LANES,
        |a, b| unsafe { K::bitwise_assign(op, a, b) },
        |a, b| scalar::bitwise(op, a, b),
    );
}

/// # Safety
///
/// The CPU must support `K`.
unsafe fn not_assign_blocks<K: VectorBody>(acc: &mut [u64]) {
    let body_len = acc.len() - acc.len() % K::LANES;
    let (body, rest) = acc.split_at_mut(body_len);
    for chunk in body.chunks_exact_mut(K::LANES) {
        unsafe { K::not_assign(chunk) };
    }
    for word in rest {
        *word = !*word;
    }
}

/// # Safety
///
/// The CPU must support `K`.
unsafe fn popcount_blocks<K: VectorBody>(words: &[u64]) -> u64 {
    fold_word_blocks(
        words,
        K::LANES,
        |block| unsafe { K::popcount(block) },
        |w| w.count_ones() as u64,
    )
}

impl Dispatcher {
    /// `acc[i] = acc[i] op other[i]` for `i < min(len)`
    pub fn bitwise_assign(&self, op: BitOp, acc: &mut [u64], other: &[u64]) {
        let len = acc.len().min(other.len());
        if len == 0 {
            return;
        }
        with_vector_body!(self.numeric_variant(len),
            K => bitwise_assign_blocks::<K>(op, acc, other),
            _ => {
                for (a, &b) in acc.iter_mut().zip(other) {
                    *a = scalar::bitwise(op, *a, b);
                }
            },
        )
    }

    /// `a op b` over the common prefix
    pub fn bitwise(&self, op: BitOp, a: &[u64], b: &[u64]) -> Bitmask {
        let len = a.len().min(b.len());
        let mut out = a[..len].to_vec();
        self.bitwise_assign(op, &mut out, &b[..len]);
        out
    }

    pub fn and(&self, a: &[u64], b: &[u64]) -> Bitmask {
        self.bitwise(BitOp::And, a, b)
    }

    pub fn or(&self, a: &[u64], b: &[u64]) -> Bitmask {
        self.bitwise(BitOp::Or, a, b)
    }

    pub fn xor(&self, a: &[u64], b: &[u64]) -> Bitmask {
        self.bitwise(BitOp::Xor, a, b)
    }

    /// Complement every word in place; bits past the logical row count flip too
    pub fn not_assign(&self, acc: &mut [u64]) {
        if acc.is_empty() {
            return;
        }
        with_vector_body!(self.numeric_variant(acc.len()),
            K => not_assign_blocks::<K>(acc),
            _ => {
                for word in acc.iter_mut() {
                    *word = !*word;
                }
            },
        )
    }

    pub fn not(&self, a: &[u64]) -> Bitmask {
        let mut out = a.to_vec();
        self.not_assign(&mut out);
        out
    }

    /// Total set bits
    pub fn popcount(&self, words: &[u64]) -> u64 {
        if words.is_empty() {
            return 0;
        }
        with_vector_body!(self.numeric_variant(words.len()),
            K => popcount_blocks::<K>(words),
            _ => scalar::popcount(words),
        )
    }
}

pub fn and(a: &[u64], b: &[u64]) -> Bitmask {
    Dispatcher::detect().and(a, b)
}

pub fn or(a: &[u64], b: &[u64]) -> Bitmask {
    Dispatcher::detect().or(a, b)
}

pub fn xor(a: &[u64], b: &[u64]) -> Bitmask {
    Dispatcher::detect().xor(a, b)
}

pub fn not(a: &[u64]) -> Bitmask {
    Dispatcher::detect().not(a)
}

pub fn popcount(words: &[u64]) -> u64 {
    Dispatcher::detect().popcount(words)
}

pub fn and_assign(acc: &mut [u64], other: &[u64]) {
    Dispatcher::detect().bitwise_assign(BitOp::And, acc, other)
}

pub fn or_assign(acc: &mut [u64], other: &[u64]) {
    Dispatcher::detect().bitwise_assign(BitOp::Or, acc, other)
}

pub fn xor_assign(acc: &mut [u64], other: &[u64]) {
    Dispatcher::detect().bitwise_assign(BitOp::Xor, acc, other)
}

pub fn not_assign(acc: &mut [u64]) {
    Dispatcher::detect().not_assign(acc)
}
