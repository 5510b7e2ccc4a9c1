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

//! Per-element and whole-buffer hashes.
//!
//! Every per-element hash reads the value as its 8 little-endian bytes, so
//! results are identical across architectures. Slice kernels write into a
//! caller-sized output and reject a length mismatch before writing anything.

use std::hash::Hasher;

use tracing::debug;
use twox_hash::XxHash64;

use crate::dispatch::Dispatcher;
use crate::error::{SimdResult, check_output_len};
use crate::kernel::{VectorBody, map_blocks, scalar, with_vector_body};

/// FNV-1a 64-bit offset basis
pub const FNV_OFFSET_BASIS: u64 = 14_695_981_039_346_656_037;
/// FNV-1a 64-bit prime
pub const FNV_PRIME: u64 = 1_099_511_628_211;

// XXH64 primes
pub const PRIME64_1: u64 = 0x9E37_79B1_85EB_CA87;
pub const PRIME64_2: u64 = 0xC2B2_AE3D_27D4_EB4F;
pub const PRIME64_3: u64 = 0x1656_67B1_9E37_79F9;
pub const PRIME64_4: u64 = 0x85EB_CA77_C2B2_AE63;
pub const PRIME64_5: u64 = 0x27D4_EB2F_1656_67C5;

fn map_scalar<O>(values: &[i64], out: &mut [O], hash: impl Fn(i64) -> O) {
    for (v, slot) in values.iter().zip(out.iter_mut()) {
        *slot = hash(*v);
    }
}

impl Dispatcher {
    /// FNV-1a of each element into `out`
    pub fn fnv1a_i64(&self, values: &[i64], out: &mut [u64]) -> SimdResult<()> {
        check_output_len(values.len(), out.len())
            .inspect_err(|e| debug!(error = %e, "fnv1a_i64 rejected"))?;
        if values.is_empty() {
            return Ok(());
        }
        with_vector_body!(self.numeric_variant(values.len()),
            K => map_blocks(
                values,
                out,
                K::LANES,
                |b, o| unsafe { K::fnv1a_i64(b, o) },
                scalar::fnv1a_i64,
            ),
            _ => map_scalar(values, out, scalar::fnv1a_i64),
        );
        Ok(())
    }

    /// XXH64 (seed 0) of each element into `out`
    pub fn xxhash64_i64(&self, values: &[i64], out: &mut [u64]) -> SimdResult<()> {
        check_output_len(values.len(), out.len())
            .inspect_err(|e| debug!(error = %e, "xxhash64_i64 rejected"))?;
        if values.is_empty() {
            return Ok(());
        }
        with_vector_body!(self.numeric_variant(values.len()),
            K => map_blocks(
                values,
                out,
                K::LANES,
                |b, o| unsafe { K::xxhash64_i64(b, o) },
                scalar::xxhash64_i64,
            ),
            _ => map_scalar(values, out, scalar::xxhash64_i64),
        );
        Ok(())
    }

    /// CRC-32/IEEE of each element into `out`
    pub fn crc32_i64(&self, values: &[i64], out: &mut [u32]) -> SimdResult<()> {
        check_output_len(values.len(), out.len())
            .inspect_err(|e| debug!(error = %e, "crc32_i64 rejected"))?;
        if values.is_empty() {
            return Ok(());
        }
        with_vector_body!(self.numeric_variant(values.len()),
            K => map_blocks(
                values,
                out,
                K::LANES,
                |b, o| unsafe { K::crc32_i64(b, o) },
                scalar::crc32_i64,
            ),
            _ => map_scalar(values, out, scalar::crc32_i64),
        );
        Ok(())
    }
}

pub fn fnv1a_i64(values: &[i64], out: &mut [u64]) -> SimdResult<()> {
    Dispatcher::detect().fnv1a_i64(values, out)
}

pub fn xxhash64_i64(values: &[i64], out: &mut [u64]) -> SimdResult<()> {
    Dispatcher::detect().xxhash64_i64(values, out)
}

pub fn crc32_i64(values: &[i64], out: &mut [u32]) -> SimdResult<()> {
    Dispatcher::detect().crc32_i64(values, out)
}

/// XXH64 (seed 0) of a whole buffer
pub fn xxhash64_bytes(data: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(data);
    hasher.finish()
}

/// CRC-32/IEEE of a whole buffer
pub fn crc32_bytes(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimdError;

    #[test]
    fn test_fnv1a_reference() {
        // FNV-1a 64 of the 8 bytes 01 00 00 00 00 00 00 00, computed bytewise
        let mut expected = FNV_OFFSET_BASIS;
        for byte in 1i64.to_le_bytes() {
            expected ^= byte as u64;
            expected = expected.wrapping_mul(FNV_PRIME);
        }
        let mut out = [0u64; 1];
        fnv1a_i64(&[1], &mut out).unwrap();
        assert_eq!(out[0], expected);
    }

    #[test]
    fn test_fnv1a_published_vector() {
        // Published FNV-1a 64 test vector: "a" -> 0xaf63dc4c8601ec8c
        let hash = (FNV_OFFSET_BASIS ^ b'a' as u64).wrapping_mul(FNV_PRIME);
        assert_eq!(hash, 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_crc32_matches_crc32fast() {
        let values: Vec<i64> = (-50..50).map(|i| i * 1_000_003).collect();
        let mut out = vec![0u32; values.len()];
        crc32_i64(&values, &mut out).unwrap();
        for (v, h) in values.iter().zip(&out) {
            assert_eq!(*h, crc32fast::hash(&v.to_le_bytes()));
        }
    }

    #[test]
    fn test_xxhash_matches_twox() {
        let values: Vec<i64> = (0..37).map(|i| i * 0x1234_5678_9abc).collect();
        let mut out = vec![0u64; values.len()];
        xxhash64_i64(&values, &mut out).unwrap();
        for (v, h) in values.iter().zip(&out) {
            assert_eq!(*h, xxhash64_bytes(&v.to_le_bytes()));
        }
    }

    #[test]
    fn test_whole_buffer_known_values() {
        assert_eq!(crc32_bytes(b"123456789"), 0xCBF4_3926);
        assert_eq!(xxhash64_bytes(b""), 0xEF46_DB37_51D8_E999);
    }

    #[test]
    fn test_length_mismatch_writes_nothing() {
        let values = [1i64, 2, 3];
        let mut out = [7u64; 2];
        let err = fnv1a_i64(&values, &mut out).unwrap_err();
        assert_eq!(err, SimdError::ContractViolation { expected: 3, actual: 2 });
        assert_eq!(out, [7, 7]);

        let mut crc = [9u32; 4];
        assert!(crc32_i64(&values, &mut crc).is_err());
        assert_eq!(crc, [9; 4]);

        let mut xxh = [5u64; 0];
        assert!(xxhash64_i64(&values, &mut xxh).is_err());
    }

    #[test]
    fn test_paths_agree() {
        let values: Vec<i64> = (0..23).map(|i| i * -7_777_777).collect();
        let mut a = vec![0u64; 23];
        let mut b = vec![0u64; 23];
        Dispatcher::vector().fnv1a_i64(&values, &mut a).unwrap();
        Dispatcher::scalar().fnv1a_i64(&values, &mut b).unwrap();
        assert_eq!(a, b);
        Dispatcher::vector().xxhash64_i64(&values, &mut a).unwrap();
        Dispatcher::scalar().xxhash64_i64(&values, &mut b).unwrap();
        assert_eq!(a, b);
    }
}
