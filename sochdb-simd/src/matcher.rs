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

//! Wildcard Matcher
//!
//! Applies a [`CompiledPattern`] to a column of byte strings. Simple shapes
//! route to the byte-string kernels; the general shape runs a two-pointer
//! scan with one backtrack anchor per value.

use tracing::debug;

use crate::bitmask::{Bitmask, allocate_bitmap, set_bit, unpack_bools};
use crate::dispatch::Dispatcher;
use crate::pattern::{CompiledPattern, PatternType};
use crate::string::StrOp;

/// Match one value against a `LIKE` pattern.
///
/// `%` records an anchor and is first tried as the empty run; on a mismatch
/// the scan resumes just after the most recent `%` with the anchored value
/// position moved forward by one. Trailing `%`s match the empty string.
pub fn match_wildcard(value: &[u8], pattern: &[u8]) -> bool {
    let (mut vi, mut pi) = (0usize, 0usize);
    // (pattern index of the last '%', value index it is currently absorbing up to)
    let mut anchor: Option<(usize, usize)> = None;

    while vi < value.len() {
        match pattern.get(pi) {
            Some(b'%') => {
                anchor = Some((pi, vi));
                pi += 1;
            }
            Some(&c) if c == b'_' || c == value[vi] => {
                vi += 1;
                pi += 1;
            }
            _ => match anchor.as_mut() {
                Some((star, mark)) => {
                    *mark += 1;
                    vi = *mark;
                    pi = *star + 1;
                }
                None => return false,
            },
        }
    }

    pattern[pi..].iter().all(|&c| c == b'%')
}

impl Dispatcher {
    /// Packed `values[i] LIKE pattern`
    pub fn like_mask<S: AsRef<[u8]>>(&self, values: &[S], pattern: &CompiledPattern) -> Bitmask {
        if values.is_empty() {
            return Bitmask::new();
        }
        let op = match pattern.pattern_type() {
            PatternType::Exact => StrOp::Eq,
            PatternType::Prefix => StrOp::HasPrefix,
            PatternType::Suffix => StrOp::HasSuffix,
            PatternType::Contains => StrOp::Contains,
            PatternType::Wildcard => {
                let text = pattern.as_str().as_bytes();
                let mut bitmap = allocate_bitmap(values.len());
                for (i, v) in values.iter().enumerate() {
                    if match_wildcard(v.as_ref(), text) {
                        set_bit(&mut bitmap, i);
                    }
                }
                return bitmap;
            }
        };
        self.cmp_str_mask(values, op, pattern.literal())
    }

    /// Boolean `values[i] LIKE pattern`
    pub fn like<S: AsRef<[u8]>>(&self, values: &[S], pattern: &CompiledPattern) -> Vec<bool> {
        unpack_bools(&self.like_mask(values, pattern), values.len())
    }

    /// Compile and match in one call; an invalid pattern matches nothing
    pub fn like_str_mask<S: AsRef<[u8]>>(&self, values: &[S], pattern: &str) -> Bitmask {
        match CompiledPattern::new(pattern) {
            Ok(compiled) => self.like_mask(values, &compiled),
            Err(e) => {
                debug!(pattern, error = %e, "invalid LIKE pattern, matching nothing");
                allocate_bitmap(values.len())
            }
        }
    }

    /// Compile and match in one call; an invalid pattern matches nothing
    pub fn like_str<S: AsRef<[u8]>>(&self, values: &[S], pattern: &str) -> Vec<bool> {
        unpack_bools(&self.like_str_mask(values, pattern), values.len())
    }
}

pub fn like<S: AsRef<[u8]>>(values: &[S], pattern: &CompiledPattern) -> Vec<bool> {
    Dispatcher::detect().like(values, pattern)
}

pub fn like_mask<S: AsRef<[u8]>>(values: &[S], pattern: &CompiledPattern) -> Bitmask {
    Dispatcher::detect().like_mask(values, pattern)
}

pub fn like_str<S: AsRef<[u8]>>(values: &[S], pattern: &str) -> Vec<bool> {
    Dispatcher::detect().like_str(values, pattern)
}

pub fn like_str_mask<S: AsRef<[u8]>>(values: &[S], pattern: &str) -> Bitmask {
    Dispatcher::detect().like_str_mask(values, pattern)
}
