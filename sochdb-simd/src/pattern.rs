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

//! LIKE Pattern Compiler
//!
//! Classifies a SQL `LIKE` pattern (`%` = any run, `_` = any one byte) and
//! compiles it into literal segments so the matcher can route simple shapes
//! to the byte-string kernels.
//!
//! | Pattern | Category | Segments |
//! |---------|----------|----------|
//! | `hello` | Exact | `hello` |
//! | `hello%` | Prefix | `hello` |
//! | `%world` | Suffix | `world` |
//! | `%test%` | Contains | `test` |
//! | `h_llo`, `a%b%c`, `%a%b%` | Wildcard | non-empty `%`-separated pieces |

use std::fmt;

use tracing::debug;

use crate::error::{SimdError, SimdResult};

/// Shape of a `LIKE` pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum PatternType {
    /// No wildcards
    Exact = 0,
    /// Single trailing `%`
    Prefix = 1,
    /// Single leading `%`
    Suffix = 2,
    /// Exactly `%literal%`
    Contains = 3,
    /// Any `_`, or `%` anywhere else
    Wildcard = 4,
}

impl TryFrom<i32> for PatternType {
    type Error = SimdError;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(PatternType::Exact),
            1 => Ok(PatternType::Prefix),
            2 => Ok(PatternType::Suffix),
            3 => Ok(PatternType::Contains),
            4 => Ok(PatternType::Wildcard),
            other => Err(SimdError::configuration(format!(
                "invalid pattern type: {other}"
            ))),
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PatternType::Exact => "Exact",
            PatternType::Prefix => "Prefix",
            PatternType::Suffix => "Suffix",
            PatternType::Contains => "Contains",
            PatternType::Wildcard => "Wildcard",
        };
        f.write_str(name)
    }
}

/// Classify a pattern. Never fails; the empty pattern is `Exact`.
pub fn classify(pattern: &str) -> PatternType {
    if pattern.contains('_') {
        return PatternType::Wildcard;
    }
    if !pattern.contains('%') {
        return PatternType::Exact;
    }

    let percents = pattern.matches('%').count();
    let leading = pattern.starts_with('%');
    let trailing = pattern.ends_with('%');
    match (leading, trailing, percents) {
        (true, true, 2) => PatternType::Contains,
        (true, false, 1) => PatternType::Suffix,
        (false, true, 1) => PatternType::Prefix,
        _ => PatternType::Wildcard,
    }
}

/// A classified pattern split into its literal segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    pattern_type: PatternType,
    segments: Vec<Vec<u8>>,
    has_wildcard: bool,
    original: String,
}

impl CompiledPattern {
    /// Compile `pattern` as the given category.
    ///
    /// The category is trusted: simple categories strip one anchor `%` at
    /// each anchored end and keep the rest as a single literal, even if it
    /// still contains wildcard characters.
    pub fn compile(pattern_type: PatternType, pattern: &str) -> SimdResult<Self> {
        if pattern.is_empty() {
            return Err(SimdError::configuration("pattern is empty"));
        }

        let segments = match pattern_type {
            PatternType::Exact => vec![pattern.as_bytes().to_vec()],
            PatternType::Prefix => {
                let inner = pattern.strip_suffix('%').unwrap_or(pattern);
                vec![single_literal(pattern_type, pattern, inner)?]
            }
            PatternType::Suffix => {
                let inner = pattern.strip_prefix('%').unwrap_or(pattern);
                vec![single_literal(pattern_type, pattern, inner)?]
            }
            PatternType::Contains => {
                let inner = pattern.strip_suffix('%').unwrap_or(pattern);
                let inner = inner.strip_prefix('%').unwrap_or(inner);
                vec![single_literal(pattern_type, pattern, inner)?]
            }
            PatternType::Wildcard => {
                let segments: Vec<Vec<u8>> = pattern
                    .split('%')
                    .filter(|seg| !seg.is_empty())
                    .map(|seg| seg.as_bytes().to_vec())
                    .collect();
                if segments.is_empty() {
                    return Err(SimdError::configuration(format!(
                        "wildcard pattern has no literal segments: {pattern:?}"
                    )));
                }
                segments
            }
        };

        let compiled = Self {
            pattern_type,
            segments,
            has_wildcard: pattern.contains(['%', '_']),
            original: pattern.to_owned(),
        };
        debug!(pattern, kind = %pattern_type, segments = compiled.segments.len(), "compiled LIKE pattern");
        Ok(compiled)
    }

    /// Classify, then compile
    pub fn new(pattern: &str) -> SimdResult<Self> {
        Self::compile(classify(pattern), pattern)
    }

    /// Compile with a raw category tag
    pub fn from_tag(tag: i32, pattern: &str) -> SimdResult<Self> {
        Self::compile(PatternType::try_from(tag)?, pattern)
    }

    pub fn pattern_type(&self) -> PatternType {
        self.pattern_type
    }

    /// Literal segments in pattern order
    pub fn segments(&self) -> &[Vec<u8>] {
        &self.segments
    }

    /// The single literal of a simple category
    pub fn literal(&self) -> &[u8] {
        // Every successful compile leaves at least one segment
        self.segments.first().map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether the original text contains `%` or `_`
    pub fn has_wildcard(&self) -> bool {
        self.has_wildcard
    }

    pub fn as_str(&self) -> &str {
        &self.original
    }
}

impl fmt::Display for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.original, self.pattern_type)
    }
}

fn single_literal(pattern_type: PatternType, pattern: &str, literal: &str) -> SimdResult<Vec<u8>> {
    if literal.is_empty() {
        return Err(SimdError::configuration(format!(
            "{} pattern has no literal part: {pattern:?}",
            pattern_type.to_string().to_lowercase()
        )));
    }
    Ok(literal.as_bytes().to_vec())
}
