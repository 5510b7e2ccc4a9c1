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

//! Hardware Capability Registry
//!
//! Detects the vector extensions of the host CPU once and caches the
//! result for the lifetime of the process. Every dispatch decision reads
//! this set; it is never invalidated.
//!
//! ## Usage
//!
//! ```rust
//! use sochdb_simd::capability::{capabilities, has_extension, Extension};
//!
//! if has_extension("avx2") {
//!     assert!(capabilities().has(Extension::Avx2));
//! }
//! assert!(!has_extension("no-such-extension"));
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::dispatch::KernelVariant;
use crate::error::SimdError;

/// A hardware vector extension the registry knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    /// SSE4.2 (x86_64)
    Sse42,
    /// AVX2, 256-bit integer and float lanes (x86_64)
    Avx2,
    /// AVX-512 Foundation (x86_64)
    Avx512f,
    /// Advanced SIMD, 128-bit lanes (aarch64)
    Neon,
    /// Scalable Vector Extension (aarch64)
    Sve,
}

impl Extension {
    /// All known extensions, in flag-bit order
    pub const ALL: [Extension; 5] = [
        Extension::Sse42,
        Extension::Avx2,
        Extension::Avx512f,
        Extension::Neon,
        Extension::Sve,
    ];

    /// Canonical lower-case name
    pub fn name(&self) -> &'static str {
        match self {
            Extension::Sse42 => "sse4.2",
            Extension::Avx2 => "avx2",
            Extension::Avx512f => "avx512f",
            Extension::Neon => "neon",
            Extension::Sve => "sve",
        }
    }

    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Extension {
    type Err = SimdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sse4.2" | "sse42" => Ok(Extension::Sse42),
            "avx2" => Ok(Extension::Avx2),
            "avx512f" | "avx512" => Ok(Extension::Avx512f),
            "neon" | "asimd" => Ok(Extension::Neon),
            "sve" => Ok(Extension::Sve),
            other => Err(SimdError::configuration(format!(
                "unknown vector extension: {other:?}"
            ))),
        }
    }
}

/// Immutable set of detected extensions, one bit per [`Extension`]
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    flags: u32,
}

impl Capabilities {
    /// Probe the current CPU
    #[allow(unused_mut)]
    fn probe() -> Self {
        let mut caps = Capabilities::none();

        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("sse4.2") {
                caps.flags |= Extension::Sse42.bit();
            }
            if is_x86_feature_detected!("avx2") {
                caps.flags |= Extension::Avx2.bit();
            }
            if is_x86_feature_detected!("avx512f") {
                caps.flags |= Extension::Avx512f.bit();
            }
        }

        #[cfg(target_arch = "aarch64")]
        {
            if std::arch::is_aarch64_feature_detected!("neon") {
                caps.flags |= Extension::Neon.bit();
            }
            if std::arch::is_aarch64_feature_detected!("sve") {
                caps.flags |= Extension::Sve.bit();
            }
        }

        caps
    }

    /// The cached set detected for this process
    pub fn detected() -> Self {
        capabilities()
    }

    /// The empty set: every dispatch decision becomes scalar
    pub const fn none() -> Self {
        Self { flags: 0 }
    }

    /// Whether `ext` is present
    #[inline]
    pub fn has(&self, ext: Extension) -> bool {
        self.flags & ext.bit() != 0
    }

    /// This set with `ext` removed.
    ///
    /// Flags can only be removed; a set never claims an extension the host
    /// does not have, so vector bodies selected from it are always safe to run.
    pub fn without(self, ext: Extension) -> Self {
        Self {
            flags: self.flags & !ext.bit(),
        }
    }

    /// Iterate over the extensions present
    pub fn iter(&self) -> impl Iterator<Item = Extension> + '_ {
        Extension::ALL.into_iter().filter(|ext| self.has(*ext))
    }

    /// Whether no extension is present
    pub fn is_empty(&self) -> bool {
        self.flags == 0
    }

    /// The widest implemented vector kernel variant this set supports
    pub fn vector_variant(&self) -> Option<KernelVariant> {
        if cfg!(target_arch = "x86_64") && self.has(Extension::Avx2) {
            return Some(KernelVariant::Avx2);
        }
        if cfg!(target_arch = "aarch64") && self.has(Extension::Neon) {
            return Some(KernelVariant::Neon);
        }
        None
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|e| e.name())).finish()
    }
}

/// Global cached capability set
static CAPABILITIES: OnceLock<Capabilities> = OnceLock::new();

/// Get the cached capability set, probing the CPU on first use
pub fn capabilities() -> Capabilities {
    *CAPABILITIES.get_or_init(|| {
        let caps = Capabilities::probe();
        tracing::debug!(capabilities = ?caps, "detected vector extensions");
        caps
    })
}

/// Whether the named extension is available on this host.
///
/// Names are case-insensitive; unknown names report `false`.
pub fn has_extension(name: &str) -> bool {
    name.parse::<Extension>()
        .map(|ext| capabilities().has(ext))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_is_cached() {
        assert_eq!(capabilities(), capabilities());
        assert_eq!(Capabilities::detected(), capabilities());
    }

    #[test]
    fn test_extension_names_round_trip() {
        for ext in Extension::ALL {
            assert_eq!(ext.name().parse::<Extension>().unwrap(), ext);
            assert_eq!(ext.to_string().to_uppercase().parse::<Extension>().unwrap(), ext);
        }
        assert!("mmx".parse::<Extension>().is_err());
    }

    #[test]
    fn test_has_extension_matches_registry() {
        let caps = capabilities();
        for ext in Extension::ALL {
            assert_eq!(has_extension(ext.name()), caps.has(ext));
        }
        assert!(!has_extension(""));
        assert!(!has_extension("quantum"));
    }

    #[test]
    fn test_none_has_nothing() {
        let caps = Capabilities::none();
        assert!(caps.is_empty());
        assert_eq!(caps.iter().count(), 0);
        assert_eq!(caps.vector_variant(), None);
    }

    #[test]
    fn test_without_only_removes() {
        let caps = capabilities();
        let reduced = caps.without(Extension::Avx2).without(Extension::Neon);
        assert!(!reduced.has(Extension::Avx2));
        assert!(!reduced.has(Extension::Neon));
        assert_eq!(reduced.vector_variant(), None);
        for ext in reduced.iter() {
            assert!(caps.has(ext));
        }
    }

    #[test]
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    fn test_platform_expectations() {
        assert!(capabilities().is_empty());
    }

    #[test]
    #[cfg(target_arch = "x86_64")]
    fn test_platform_expectations() {
        let caps = capabilities();
        assert!(!caps.has(Extension::Neon));
        assert!(!caps.has(Extension::Sve));
    }

    #[test]
    #[cfg(target_arch = "aarch64")]
    fn test_platform_expectations() {
        let caps = capabilities();
        assert!(!caps.has(Extension::Avx2));
        assert!(!caps.has(Extension::Avx512f));
    }
}
