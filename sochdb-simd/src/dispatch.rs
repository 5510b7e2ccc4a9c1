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

//! Dispatch Policy
//!
//! Chooses between a vector kernel variant and the scalar fallback for one
//! call. The decision is a pure function of the capability set, a threshold
//! snapshot and the input shape, so identical inputs always produce the same
//! choice:
//!
//! | Kernel family | Vector when |
//! |---------------|-------------|
//! | fixed-width (i64/f64/u64 words) | capability present and `len >= lanes` |
//! | byte strings | capability present, `len >= min_element_count` and `bytes/len >= min_average_byte_length` |
//!
//! A [`Dispatcher`] bundles the policy with a capability set and an optional
//! override. The override exists so tests and benchmarks can force one path
//! and compare it against the other.

use crate::capability::{Capabilities, capabilities};
use crate::config::{ThresholdConfig, get_threshold};

/// A concrete kernel implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelVariant {
    /// Element-at-a-time reference implementation
    Scalar,
    /// x86_64 AVX2, 256-bit registers (4 x 64-bit lanes)
    Avx2,
    /// aarch64 NEON, 128-bit registers (2 x 64-bit lanes)
    Neon,
}

impl KernelVariant {
    /// 64-bit lanes per block
    #[inline]
    pub const fn lanes(self) -> usize {
        match self {
            KernelVariant::Scalar => 1,
            KernelVariant::Avx2 => 4,
            KernelVariant::Neon => 2,
        }
    }

    /// Bytes compared per step by the byte-string kernels
    #[inline]
    pub const fn byte_width(self) -> usize {
        match self {
            KernelVariant::Scalar => 1,
            KernelVariant::Avx2 => 32,
            KernelVariant::Neon => 16,
        }
    }

    #[inline]
    pub fn is_vector(self) -> bool {
        self != KernelVariant::Scalar
    }

    pub fn name(self) -> &'static str {
        match self {
            KernelVariant::Scalar => "scalar",
            KernelVariant::Avx2 => "avx2",
            KernelVariant::Neon => "neon",
        }
    }
}

/// Policy for fixed-width kernels
pub fn select_numeric(caps: &Capabilities, element_count: usize) -> KernelVariant {
    match caps.vector_variant() {
        Some(variant) if element_count >= variant.lanes() => variant,
        _ => KernelVariant::Scalar,
    }
}

/// Policy for byte-string kernels
pub fn select_string(
    caps: &Capabilities,
    thresholds: &ThresholdConfig,
    element_count: usize,
    total_bytes: usize,
) -> KernelVariant {
    let Some(variant) = caps.vector_variant() else {
        return KernelVariant::Scalar;
    };
    if element_count == 0 || element_count < thresholds.min_element_count {
        return KernelVariant::Scalar;
    }
    if total_bytes / element_count < thresholds.min_average_byte_length {
        return KernelVariant::Scalar;
    }
    variant
}

/// Override applied on top of the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Apply the policy
    Auto,
    /// Always run the scalar variant
    ForceScalar,
    /// Run the widest vector variant the capability set allows, whatever the
    /// input shape; scalar when there is none
    ForceVector,
}

/// Capability set plus dispatch mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatcher {
    capabilities: Capabilities,
    mode: DispatchMode,
}

impl Dispatcher {
    /// Auto policy over the detected capabilities
    pub fn detect() -> Self {
        Self {
            capabilities: capabilities(),
            mode: DispatchMode::Auto,
        }
    }

    /// Always scalar
    pub fn scalar() -> Self {
        Self {
            capabilities: capabilities(),
            mode: DispatchMode::ForceScalar,
        }
    }

    /// Always the widest available vector variant
    pub fn vector() -> Self {
        Self {
            capabilities: capabilities(),
            mode: DispatchMode::ForceVector,
        }
    }

    /// Auto policy over a restricted capability set
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            mode: DispatchMode::Auto,
        }
    }

    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Variant for a fixed-width kernel over `element_count` elements
    #[inline]
    pub fn numeric_variant(&self, element_count: usize) -> KernelVariant {
        match self.mode {
            DispatchMode::Auto => select_numeric(&self.capabilities, element_count),
            DispatchMode::ForceScalar => KernelVariant::Scalar,
            DispatchMode::ForceVector => self
                .capabilities
                .vector_variant()
                .unwrap_or(KernelVariant::Scalar),
        }
    }

    /// Variant for a byte-string kernel, using the current global thresholds
    pub fn string_variant<S: AsRef<[u8]>>(&self, values: &[S]) -> KernelVariant {
        if self.mode != DispatchMode::Auto {
            return self.numeric_variant(values.len());
        }
        let total_bytes = values.iter().map(|v| v.as_ref().len()).sum();
        self.string_variant_with(&get_threshold(), values.len(), total_bytes)
    }

    /// Variant for a byte-string kernel against an explicit threshold snapshot
    pub fn string_variant_with(
        &self,
        thresholds: &ThresholdConfig,
        element_count: usize,
        total_bytes: usize,
    ) -> KernelVariant {
        match self.mode {
            DispatchMode::Auto => {
                select_string(&self.capabilities, thresholds, element_count, total_bytes)
            }
            DispatchMode::ForceScalar => KernelVariant::Scalar,
            DispatchMode::ForceVector => self
                .capabilities
                .vector_variant()
                .unwrap_or(KernelVariant::Scalar),
        }
    }

    /// Variant for a single-pair byte kernel over `byte_len` bytes: vector
    /// once the input fills one register
    pub fn bytes_variant(&self, byte_len: usize) -> KernelVariant {
        match self.mode {
            DispatchMode::Auto => match self.capabilities.vector_variant() {
                Some(variant) if byte_len >= variant.byte_width() => variant,
                _ => KernelVariant::Scalar,
            },
            DispatchMode::ForceScalar => KernelVariant::Scalar,
            DispatchMode::ForceVector => self
                .capabilities
                .vector_variant()
                .unwrap_or(KernelVariant::Scalar),
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::detect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Extension;

    fn thresholds(count: usize, avg: usize) -> ThresholdConfig {
        ThresholdConfig {
            min_element_count: count,
            min_average_byte_length: avg,
        }
    }

    #[test]
    fn test_lanes() {
        assert_eq!(KernelVariant::Scalar.lanes(), 1);
        assert_eq!(KernelVariant::Avx2.lanes(), 4);
        assert_eq!(KernelVariant::Neon.lanes(), 2);
        assert!(!KernelVariant::Scalar.is_vector());
        assert!(KernelVariant::Avx2.is_vector());
    }

    #[test]
    fn test_no_capabilities_is_always_scalar() {
        let caps = Capabilities::none();
        for n in [0, 1, 4, 16, 1 << 20] {
            assert_eq!(select_numeric(&caps, n), KernelVariant::Scalar);
            assert_eq!(
                select_string(&caps, &thresholds(1, 1), n, n * 100),
                KernelVariant::Scalar
            );
        }
        let d = Dispatcher::with_capabilities(caps).with_mode(DispatchMode::ForceVector);
        assert_eq!(d.numeric_variant(1000), KernelVariant::Scalar);
    }

    #[test]
    fn test_numeric_block_threshold() {
        let caps = capabilities();
        let Some(variant) = caps.vector_variant() else {
            return;
        };
        let lanes = variant.lanes();
        assert_eq!(select_numeric(&caps, 0), KernelVariant::Scalar);
        assert_eq!(select_numeric(&caps, lanes - 1), KernelVariant::Scalar);
        assert_eq!(select_numeric(&caps, lanes), variant);
        assert_eq!(select_numeric(&caps, 16), variant);
    }

    #[test]
    fn test_string_thresholds() {
        let caps = capabilities();
        let Some(variant) = caps.vector_variant() else {
            return;
        };
        let t = thresholds(16, 32);
        assert_eq!(select_string(&caps, &t, 0, 0), KernelVariant::Scalar);
        assert_eq!(select_string(&caps, &t, 15, 15 * 64), KernelVariant::Scalar);
        assert_eq!(select_string(&caps, &t, 16, 16 * 31), KernelVariant::Scalar);
        assert_eq!(select_string(&caps, &t, 16, 16 * 32), variant);
        assert_eq!(select_string(&caps, &t, 100, 100 * 40), variant);
    }

    #[test]
    fn test_decisions_are_deterministic() {
        let d = Dispatcher::detect();
        let t = thresholds(4, 4);
        for n in 0..64 {
            assert_eq!(d.numeric_variant(n), d.numeric_variant(n));
            assert_eq!(
                d.string_variant_with(&t, n, n * 5),
                d.string_variant_with(&t, n, n * 5)
            );
        }
    }

    #[test]
    fn test_forced_modes() {
        assert_eq!(Dispatcher::scalar().numeric_variant(1 << 20), KernelVariant::Scalar);
        let forced = Dispatcher::vector();
        let expected = capabilities()
            .vector_variant()
            .unwrap_or(KernelVariant::Scalar);
        assert_eq!(forced.numeric_variant(1), expected);
        assert_eq!(forced.string_variant(&["a"]), expected);
        assert_eq!(Dispatcher::scalar().string_variant(&["a"; 64]), KernelVariant::Scalar);
    }

    #[test]
    fn test_bytes_variant_register_width() {
        let d = Dispatcher::detect();
        let Some(variant) = d.capabilities().vector_variant() else {
            assert_eq!(d.bytes_variant(1 << 20), KernelVariant::Scalar);
            return;
        };
        assert_eq!(d.bytes_variant(variant.byte_width() - 1), KernelVariant::Scalar);
        assert_eq!(d.bytes_variant(variant.byte_width()), variant);
        assert_eq!(Dispatcher::vector().bytes_variant(0), variant);
    }

    #[test]
    fn test_removed_capability_forces_scalar() {
        let caps = capabilities()
            .without(Extension::Avx2)
            .without(Extension::Neon);
        let d = Dispatcher::with_capabilities(caps);
        assert_eq!(d.numeric_variant(1024), KernelVariant::Scalar);
    }
}
