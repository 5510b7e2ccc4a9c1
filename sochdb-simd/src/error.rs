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

//! Error types for the vectorized primitives
//!
//! Every kernel is total over its input, so only two failure kinds exist:
//! configuration rejected at the boundary, and caller contract violations.

use thiserror::Error;

/// Result type for kernel and configuration operations
pub type SimdResult<T> = Result<T, SimdError>;

/// Errors raised by the dispatch layer and the pattern compiler
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimdError {
    /// Invalid threshold values, malformed pattern or unknown pattern tag.
    /// Rejected before any kernel runs; the previous state stays in effect.
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    /// Caller-supplied output buffer does not match the input length.
    /// Nothing has been written when this is returned.
    #[error("contract violation: output length {actual} does not match input length {expected}")]
    ContractViolation { expected: usize, actual: usize },
}

impl SimdError {
    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Whether this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

/// Check that a caller-sized output buffer matches the input length
#[inline]
pub(crate) fn check_output_len(expected: usize, actual: usize) -> SimdResult<()> {
    if expected != actual {
        return Err(SimdError::ContractViolation { expected, actual });
    }
    Ok(())
}
