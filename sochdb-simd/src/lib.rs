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

//! SochDB SIMD Layer
//!
//! Architecture-adaptive compute primitives for columnar data: the
//! execution layer beneath row filtering, aggregation and grouping.
//!
//! ## Dispatch
//!
//! Every kernel call picks a variant at call time:
//!
//! - **Capability Registry** (`capability`): CPU extensions detected once and
//!   cached for the process.
//! - **Dispatch Policy** (`dispatch`): vector for fixed-width kernels once the
//!   input fills a block; for byte strings once the column is large and long
//!   enough per the runtime thresholds (`config`).
//! - **Kernel Contract** (`kernel`, `bitmask`): blocks of `B` lanes through a
//!   vector body, the remainder through the scalar algorithm, lanes packed at
//!   absolute bit positions. Vector and scalar paths agree bit for bit.
//!
//! ## Operation Families
//!
//! - `compare`: `=, !=, >, <, >=, <=` over `i64`/`f64` (IEEE NaN semantics)
//! - `bitmap`: and/or/xor/not/popcount over packed masks
//! - `aggregate`: sum/min/max/avg/count-non-null over `i64`
//! - `hash`: FNV-1a, CRC-32, XXH64
//! - `string`: equality, prefix, suffix, substring and ASCII case folding
//! - `pattern` + `matcher`: SQL `LIKE` with `%` and `_`
//!
//! Free functions use the detected capabilities; [`Dispatcher`] methods take
//! an explicit policy, including forced scalar or forced vector execution.

pub mod aggregate;
pub mod bitmap;
pub mod bitmask;
pub mod buffer_pool;
pub mod capability;
pub mod compare;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod hash;
mod kernel;
pub mod matcher;
pub mod pattern;
pub mod string;

pub use aggregate::{avg_i64, count_non_null, max_i64, min_i64, sum_i64};
pub use bitmap::{and, and_assign, not, not_assign, or, or_assign, popcount, xor, xor_assign};
pub use bitmask::{Bitmask, get_bit, pack_bools, set_bit, unpack_bools};
pub use buffer_pool::{BufferPool, PoolStats, buffer_pool_stats};
pub use capability::{Capabilities, Extension, capabilities, has_extension};
pub use compare::{CmpOp, cmp_f64, cmp_f64_mask, cmp_i64, cmp_i64_mask};
pub use config::{PoolConfig, ThresholdConfig, get_threshold, set_threshold, set_threshold_config};
pub use dispatch::{DispatchMode, Dispatcher, KernelVariant};
pub use error::{SimdError, SimdResult};
pub use hash::{crc32_bytes, crc32_i64, fnv1a_i64, xxhash64_bytes, xxhash64_i64};
pub use matcher::{like, like_mask, like_str, like_str_mask, match_wildcard};
pub use pattern::{CompiledPattern, PatternType, classify};
pub use string::{StrOp, cmp_str, cmp_str_mask};
