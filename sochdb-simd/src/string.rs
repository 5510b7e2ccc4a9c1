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

//! Byte-string predicates and single-pair string primitives.
//!
//! Element-wise predicates compare every value against one operand and are
//! dispatched by the string policy (element count and average length, see
//! [`crate::dispatch::select_string`]). Case-insensitive operations fold ASCII
//! letters only; every other byte compares as-is.
//!
//! The vector path compares whole registers with [`VectorBody::bytes_eq`],
//! searches substrings with `memchr::memmem`, and folds case in a pooled
//! scratch buffer so no per-row allocation happens.

use std::cmp::Ordering;

use memchr::memmem;

use crate::bitmask::{Bitmask, allocate_bitmap, set_bit, unpack_bools};
use crate::buffer_pool::BufferPool;
use crate::dispatch::Dispatcher;
use crate::kernel::{VectorBody, scalar, with_vector_body};

/// Element-wise byte-string predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrOp {
    Eq,
    Ne,
    HasPrefix,
    HasSuffix,
    Contains,
    /// ASCII case-insensitive equality
    EqIgnoreCase,
}

fn mask_each<S: AsRef<[u8]>>(values: &[S], mut pred: impl FnMut(&[u8]) -> bool) -> Bitmask {
    let mut bitmap = allocate_bitmap(values.len());
    for (i, v) in values.iter().enumerate() {
        if pred(v.as_ref()) {
            set_bit(&mut bitmap, i);
        }
    }
    bitmap
}

fn str_mask_scalar<S: AsRef<[u8]>>(values: &[S], op: StrOp, operand: &[u8]) -> Bitmask {
    match op {
        StrOp::Eq => mask_each(values, |v| v == operand),
        StrOp::Ne => mask_each(values, |v| v != operand),
        StrOp::HasPrefix => mask_each(values, |v| v.starts_with(operand)),
        StrOp::HasSuffix => mask_each(values, |v| v.ends_with(operand)),
        StrOp::Contains => mask_each(values, |v| scalar::contains(v, operand)),
        StrOp::EqIgnoreCase => mask_each(values, |v| v.eq_ignore_ascii_case(operand)),
    }
}

/// # Safety
///
/// The CPU must support `K`.
unsafe fn str_mask_vector<K: VectorBody, S: AsRef<[u8]>>(
    values: &[S],
    op: StrOp,
    operand: &[u8],
) -> Bitmask {
    let n = operand.len();
    match op {
        StrOp::Eq => mask_each(values, |v| unsafe { K::bytes_eq(v, operand) }),
        StrOp::Ne => mask_each(values, |v| !unsafe { K::bytes_eq(v, operand) }),
        StrOp::HasPrefix => mask_each(values, |v| {
            v.len() >= n && unsafe { K::bytes_eq(&v[..n], operand) }
        }),
        StrOp::HasSuffix => mask_each(values, |v| {
            v.len() >= n && unsafe { K::bytes_eq(&v[v.len() - n..], operand) }
        }),
        StrOp::Contains => {
            let finder = memmem::Finder::new(operand);
            mask_each(values, |v| finder.find(v).is_some())
        }
        StrOp::EqIgnoreCase => {
            let mut folded = operand.to_vec();
            unsafe { K::to_lower_ascii(&mut folded) };
            // Only rows of the operand's length are compared, and each one
            // overwrites the whole scratch buffer first.
            let mut scratch = BufferPool::global().acquire(n);
            mask_each(values, |v| {
                if v.len() != n {
                    return false;
                }
                scratch.copy_from_slice(v);
                unsafe {
                    K::to_lower_ascii(&mut scratch);
                    K::bytes_eq(&scratch, &folded)
                }
            })
        }
    }
}

impl Dispatcher {
    /// Packed `op(values[i], operand)`
    pub fn cmp_str_mask<S: AsRef<[u8]>>(&self, values: &[S], op: StrOp, operand: &[u8]) -> Bitmask {
        if values.is_empty() {
            return Bitmask::new();
        }
        with_vector_body!(self.string_variant(values),
            K => str_mask_vector::<K, S>(values, op, operand),
            _ => str_mask_scalar(values, op, operand),
        )
    }

    /// Boolean `op(values[i], operand)`
    pub fn cmp_str<S: AsRef<[u8]>>(&self, values: &[S], op: StrOp, operand: &[u8]) -> Vec<bool> {
        unpack_bools(&self.cmp_str_mask(values, op, operand), values.len())
    }

    pub fn str_eq(&self, a: &[u8], b: &[u8]) -> bool {
        if a.len() != b.len() {
            return false;
        }
        with_vector_body!(self.bytes_variant(a.len()),
            K => K::bytes_eq(a, b),
            _ => scalar::bytes_eq(a, b),
        )
    }

    pub fn str_has_prefix(&self, s: &[u8], prefix: &[u8]) -> bool {
        s.len() >= prefix.len() && self.str_eq(&s[..prefix.len()], prefix)
    }

    pub fn str_contains(&self, s: &[u8], needle: &[u8]) -> bool {
        if self.bytes_variant(s.len()).is_vector() {
            memmem::find(s, needle).is_some()
        } else {
            scalar::contains(s, needle)
        }
    }

    pub fn str_eq_ignore_case(&self, a: &[u8], b: &[u8]) -> bool {
        if a.len() != b.len() {
            return false;
        }
        if !self.bytes_variant(a.len()).is_vector() {
            return a.eq_ignore_ascii_case(b);
        }
        let pool = BufferPool::global();
        let mut left = pool.acquire(a.len());
        let mut right = pool.acquire(b.len());
        left.copy_from_slice(a);
        right.copy_from_slice(b);
        self.str_to_lower(&mut left);
        self.str_to_lower(&mut right);
        self.str_eq(&left, &right)
    }

    /// ASCII lowercase in place
    pub fn str_to_lower(&self, s: &mut [u8]) {
        with_vector_body!(self.bytes_variant(s.len()),
            K => K::to_lower_ascii(s),
            _ => s.make_ascii_lowercase(),
        )
    }

    /// ASCII uppercase in place
    pub fn str_to_upper(&self, s: &mut [u8]) {
        with_vector_body!(self.bytes_variant(s.len()),
            K => K::to_upper_ascii(s),
            _ => s.make_ascii_uppercase(),
        )
    }
}

pub fn cmp_str_mask<S: AsRef<[u8]>>(values: &[S], op: StrOp, operand: &[u8]) -> Bitmask {
    Dispatcher::detect().cmp_str_mask(values, op, operand)
}

pub fn cmp_str<S: AsRef<[u8]>>(values: &[S], op: StrOp, operand: &[u8]) -> Vec<bool> {
    Dispatcher::detect().cmp_str(values, op, operand)
}

macro_rules! str_op_grid {
    ($($op:ident: $bools:ident, $mask:ident;)*) => {
        $(
            #[doc = concat!("`", stringify!($op), "(values[i], operand)` as booleans")]
            #[inline]
            pub fn $bools<S: AsRef<[u8]>>(values: &[S], operand: impl AsRef<[u8]>) -> Vec<bool> {
                cmp_str(values, StrOp::$op, operand.as_ref())
            }

            #[doc = concat!("`", stringify!($op), "(values[i], operand)` packed")]
            #[inline]
            pub fn $mask<S: AsRef<[u8]>>(values: &[S], operand: impl AsRef<[u8]>) -> Bitmask {
                cmp_str_mask(values, StrOp::$op, operand.as_ref())
            }
        )*
    };
}

str_op_grid! {
    Eq: cmp_eq_str, cmp_eq_str_mask;
    Ne: cmp_ne_str, cmp_ne_str_mask;
    HasPrefix: cmp_has_prefix_str, cmp_has_prefix_str_mask;
    HasSuffix: cmp_has_suffix_str, cmp_has_suffix_str_mask;
    Contains: cmp_contains_str, cmp_contains_str_mask;
    EqIgnoreCase: cmp_eq_ignore_case_str, cmp_eq_ignore_case_str_mask;
}

/// Lexicographic byte order
#[inline]
pub fn str_cmp(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
}

pub fn str_eq(a: &[u8], b: &[u8]) -> bool {
    Dispatcher::detect().str_eq(a, b)
}

pub fn str_has_prefix(s: &[u8], prefix: &[u8]) -> bool {
    Dispatcher::detect().str_has_prefix(s, prefix)
}

pub fn str_contains(s: &[u8], needle: &[u8]) -> bool {
    Dispatcher::detect().str_contains(s, needle)
}

pub fn str_eq_ignore_case(a: &[u8], b: &[u8]) -> bool {
    Dispatcher::detect().str_eq_ignore_case(a, b)
}

pub fn str_to_lower(s: &mut [u8]) {
    Dispatcher::detect().str_to_lower(s)
}

pub fn str_to_upper(s: &mut [u8]) {
    Dispatcher::detect().str_to_upper(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPS: [StrOp; 6] = [
        StrOp::Eq,
        StrOp::Ne,
        StrOp::HasPrefix,
        StrOp::HasSuffix,
        StrOp::Contains,
        StrOp::EqIgnoreCase,
    ];

    fn sample() -> Vec<String> {
        let mut values: Vec<String> = vec![
            "apple".into(),
            "APPLE".into(),
            "application".into(),
            "pineapple".into(),
            "".into(),
            "app".into(),
            "ApPlE".into(),
            "grape".into(),
        ];
        values.push("x".repeat(40) + "apple");
        values.push("apple".to_string() + &"y".repeat(70));
        values
    }

    #[test]
    fn test_basic_predicates() {
        let values = sample();
        assert_eq!(
            cmp_eq_str(&values, "apple"),
            vec![true, false, false, false, false, false, false, false, false, false]
        );
        assert_eq!(
            cmp_has_prefix_str(&values, "app"),
            vec![true, false, true, false, false, true, false, false, false, true]
        );
        assert_eq!(
            cmp_has_suffix_str(&values, "apple"),
            vec![true, false, false, true, false, false, false, false, true, false]
        );
        assert_eq!(
            cmp_eq_ignore_case_str(&values, "Apple"),
            vec![true, true, false, false, false, false, true, false, false, false]
        );
        assert_eq!(
            cmp_contains_str(&values, "ppl"),
            vec![true, false, true, true, false, false, false, false, true, true]
        );
    }

    #[test]
    fn test_empty_operand() {
        let values = sample();
        assert!(cmp_contains_str(&values, "").iter().all(|b| *b));
        assert!(cmp_has_prefix_str(&values, "").iter().all(|b| *b));
        assert_eq!(cmp_eq_str(&values, "").iter().filter(|b| **b).count(), 1);
    }

    #[test]
    fn test_paths_agree() {
        let values = sample();
        let operands: [&[u8]; 5] = [b"apple", b"APPLE", b"", b"yyy", b"xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxapple"];
        for op in OPS {
            for operand in operands {
                assert_eq!(
                    Dispatcher::vector().cmp_str_mask(&values, op, operand),
                    Dispatcher::scalar().cmp_str_mask(&values, op, operand),
                    "{op:?} {:?}",
                    String::from_utf8_lossy(operand)
                );
            }
        }
    }

    #[test]
    fn test_ne_is_complement_of_eq() {
        let values = sample();
        let eq = cmp_eq_str(&values, "grape");
        let ne = cmp_ne_str(&values, "grape");
        assert!(eq.iter().zip(&ne).all(|(a, b)| a != b));
    }

    #[test]
    fn test_accepts_byte_slices() {
        let values: Vec<&[u8]> = vec![b"\xffabc".as_slice(), b"abc".as_slice(), b"\xffABC".as_slice()];
        assert_eq!(cmp_eq_ignore_case_str(&values, b"\xffabc"), vec![true, false, true]);
        assert!(cmp_eq_str_mask(&values, b"zzz").iter().all(|w| *w == 0));
    }

    #[test]
    fn test_single_pair_primitives() {
        assert_eq!(str_cmp(b"abc", b"abd"), Ordering::Less);
        assert_eq!(str_cmp(b"abc", b"abc"), Ordering::Equal);
        assert_eq!(str_cmp(b"b", b"abc"), Ordering::Greater);
        assert_eq!(str_cmp(b"", b""), Ordering::Equal);

        let long = "The Quick Brown Fox Jumps Over The Lazy Dog, twice over.".as_bytes();
        for d in [Dispatcher::vector(), Dispatcher::scalar()] {
            assert!(d.str_eq(long, long));
            assert!(!d.str_eq(long, &long[1..]));
            assert!(d.str_has_prefix(long, b"The Quick"));
            assert!(!d.str_has_prefix(b"The", b"The Quick"));
            assert!(d.str_contains(long, b"Lazy"));
            assert!(d.str_contains(long, b""));
            assert!(!d.str_contains(b"", b"a"));
            assert!(d.str_eq_ignore_case(long, long.to_ascii_uppercase().as_slice()));
            assert!(!d.str_eq_ignore_case(b"abc", b"abd"));

            let mut lower = long.to_vec();
            d.str_to_lower(&mut lower);
            assert_eq!(lower, long.to_ascii_lowercase());
            let mut upper = long.to_vec();
            d.str_to_upper(&mut upper);
            assert_eq!(upper, long.to_ascii_uppercase());
        }
    }

    #[test]
    fn test_case_folding_is_ascii_only() {
        let mut s = "ÀBÇ-xyz".as_bytes().to_vec();
        str_to_lower(&mut s);
        assert_eq!(s, "ÀbÇ-xyz".as_bytes());
        assert!(!str_eq_ignore_case("À".as_bytes(), "à".as_bytes()));
    }
}
