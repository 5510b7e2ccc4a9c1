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

//! Vectorized Predicate Kernels
//!
//! Compare a column of `i64` or `f64` values against one threshold and report
//! which rows pass.
//!
//! ## Output forms
//!
//! ```text
//! values:    [ 3, 9, 1, 7, 9 ]      op = Ge, threshold = 7
//! mask:      0b11010 (bit i = row i, LSB first, 64 rows per word)
//! booleans:  [false, true, false, true, true]
//! ```
//!
//! The boolean form is always the unpack of the packed form, so both come
//! from the same kernel run.
//!
//! ## Throughput
//!
//! ```text
//! Scalar: 1 comparison per element
//! AVX2:   4 x 64-bit comparisons per instruction
//! NEON:   2 x 64-bit comparisons per instruction
//! ```
//!
//! ## NaN
//!
//! With `f64`, NaN on either side makes `Eq`, `Gt`, `Ge`, `Lt`, `Le` false and
//! `Ne` true, on every variant.

use std::fmt;
use std::str::FromStr;

use crate::bitmask::{Bitmask, unpack_bools};
use crate::dispatch::Dispatcher;
use crate::error::SimdError;
use crate::kernel::{VectorBody, pack_blocks, scalar, with_vector_body};

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl CmpOp {
    pub const ALL: [CmpOp; 6] = [CmpOp::Eq, CmpOp::Ne, CmpOp::Gt, CmpOp::Lt, CmpOp::Ge, CmpOp::Le];

    pub fn symbol(&self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Gt => ">",
            CmpOp::Lt => "<",
            CmpOp::Ge => ">=",
            CmpOp::Le => "<=",
        }
    }

    /// Operator that passes exactly the rows this one rejects (integers only;
    /// with NaN both sides of a pair can be false)
    pub fn negate(&self) -> CmpOp {
        match self {
            CmpOp::Eq => CmpOp::Ne,
            CmpOp::Ne => CmpOp::Eq,
            CmpOp::Gt => CmpOp::Le,
            CmpOp::Lt => CmpOp::Ge,
            CmpOp::Ge => CmpOp::Lt,
            CmpOp::Le => CmpOp::Gt,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for CmpOp {
    type Err = SimdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "==" => Ok(CmpOp::Eq),
            "!=" | "<>" => Ok(CmpOp::Ne),
            ">" => Ok(CmpOp::Gt),
            "<" => Ok(CmpOp::Lt),
            ">=" => Ok(CmpOp::Ge),
            "<=" => Ok(CmpOp::Le),
            other => Err(SimdError::configuration(format!(
                "unknown comparison operator '{other}'"
            ))),
        }
    }
}

// =============================================================================
// Dispatched kernels
// =============================================================================

/// # Safety
///
/// The CPU must support `K`.
#[inline]
unsafe fn cmp_i64_blocks<K: VectorBody>(values: &[i64], op: CmpOp, threshold: i64) -> Bitmask {
    pack_blocks(
        values,
        K::LANES,
        |block| unsafe { K::cmp_i64(op, block, threshold) },
        |v| scalar::cmp_i64(op, v, threshold),
    )
}

/// # Safety
///
/// The CPU must support `K`.
#[inline]
unsafe fn cmp_f64_blocks<K: VectorBody>(values: &[f64], op: CmpOp, threshold: f64) -> Bitmask {
    pack_blocks(
        values,
        K::LANES,
        |block| unsafe { K::cmp_f64(op, block, threshold) },
        |v| scalar::cmp_f64(op, v, threshold),
    )
}

impl Dispatcher {
    /// Packed `values[i] op threshold`
    pub fn cmp_i64_mask(&self, values: &[i64], op: CmpOp, threshold: i64) -> Bitmask {
        if values.is_empty() {
            return Bitmask::new();
        }
        with_vector_body!(self.numeric_variant(values.len()),
            K => cmp_i64_blocks::<K>(values, op, threshold),
            _ => scalar::cmp_i64_mask(values, op, threshold),
        )
    }

    /// Boolean `values[i] op threshold`
    pub fn cmp_i64(&self, values: &[i64], op: CmpOp, threshold: i64) -> Vec<bool> {
        unpack_bools(&self.cmp_i64_mask(values, op, threshold), values.len())
    }

    /// Packed `values[i] op threshold` with IEEE-754 NaN semantics
    pub fn cmp_f64_mask(&self, values: &[f64], op: CmpOp, threshold: f64) -> Bitmask {
        if values.is_empty() {
            return Bitmask::new();
        }
        with_vector_body!(self.numeric_variant(values.len()),
            K => cmp_f64_blocks::<K>(values, op, threshold),
            _ => scalar::cmp_f64_mask(values, op, threshold),
        )
    }

    /// Boolean `values[i] op threshold` with IEEE-754 NaN semantics
    pub fn cmp_f64(&self, values: &[f64], op: CmpOp, threshold: f64) -> Vec<bool> {
        unpack_bools(&self.cmp_f64_mask(values, op, threshold), values.len())
    }
}

pub fn cmp_i64_mask(values: &[i64], op: CmpOp, threshold: i64) -> Bitmask {
    Dispatcher::detect().cmp_i64_mask(values, op, threshold)
}

pub fn cmp_i64(values: &[i64], op: CmpOp, threshold: i64) -> Vec<bool> {
    Dispatcher::detect().cmp_i64(values, op, threshold)
}

pub fn cmp_f64_mask(values: &[f64], op: CmpOp, threshold: f64) -> Bitmask {
    Dispatcher::detect().cmp_f64_mask(values, op, threshold)
}

pub fn cmp_f64(values: &[f64], op: CmpOp, threshold: f64) -> Vec<bool> {
    Dispatcher::detect().cmp_f64(values, op, threshold)
}

macro_rules! operator_grid {
    ($($op:ident: $i64_bools:ident, $i64_mask:ident, $f64_bools:ident, $f64_mask:ident;)*) => {
        $(
            #[doc = concat!("`values[i] ", stringify!($op), " threshold` over `i64`, as booleans")]
            #[inline]
            pub fn $i64_bools(values: &[i64], threshold: i64) -> Vec<bool> {
                cmp_i64(values, CmpOp::$op, threshold)
            }

            #[doc = concat!("`values[i] ", stringify!($op), " threshold` over `i64`, packed")]
            #[inline]
            pub fn $i64_mask(values: &[i64], threshold: i64) -> Bitmask {
                cmp_i64_mask(values, CmpOp::$op, threshold)
            }

            #[doc = concat!("`values[i] ", stringify!($op), " threshold` over `f64`, as booleans")]
            #[inline]
            pub fn $f64_bools(values: &[f64], threshold: f64) -> Vec<bool> {
                cmp_f64(values, CmpOp::$op, threshold)
            }

            #[doc = concat!("`values[i] ", stringify!($op), " threshold` over `f64`, packed")]
            #[inline]
            pub fn $f64_mask(values: &[f64], threshold: f64) -> Bitmask {
                cmp_f64_mask(values, CmpOp::$op, threshold)
            }
        )*
    };
}

operator_grid! {
    Eq: cmp_eq_i64, cmp_eq_i64_mask, cmp_eq_f64, cmp_eq_f64_mask;
    Ne: cmp_ne_i64, cmp_ne_i64_mask, cmp_ne_f64, cmp_ne_f64_mask;
    Gt: cmp_gt_i64, cmp_gt_i64_mask, cmp_gt_f64, cmp_gt_f64_mask;
    Lt: cmp_lt_i64, cmp_lt_i64_mask, cmp_lt_f64, cmp_lt_f64_mask;
    Ge: cmp_ge_i64, cmp_ge_i64_mask, cmp_ge_f64, cmp_ge_f64_mask;
    Le: cmp_le_i64, cmp_le_i64_mask, cmp_le_f64, cmp_le_f64_mask;
}
