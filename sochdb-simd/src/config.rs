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

//! Dispatch configuration
//!
//! The string-kernel thresholds are process-wide and may be changed at
//! runtime. They live in an [`ArcSwap`] cell: readers take one atomic
//! snapshot per kernel call, writers replace the whole value. A reader sees
//! either the old pair or the new pair, never a mix.
//!
//! ```text
//! set_threshold(a, b) ──validate──► Arc::new(ThresholdConfig{a, b}) ──store──► cell
//! kernel call ──────────────────────────────────────────── load ◄──────────── cell
//! ```

use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

use crate::error::{SimdError, SimdResult};

/// Default minimum number of strings before string kernels vectorize
pub const DEFAULT_MIN_ELEMENT_COUNT: usize = 16;

/// Default minimum average string length before string kernels vectorize
pub const DEFAULT_MIN_AVERAGE_BYTE_LENGTH: usize = 32;

/// Thresholds gating vectorization of byte-string kernels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Minimum number of values in the input
    pub min_element_count: usize,
    /// Minimum of `total bytes / value count`
    pub min_average_byte_length: usize,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_element_count: DEFAULT_MIN_ELEMENT_COUNT,
            min_average_byte_length: DEFAULT_MIN_AVERAGE_BYTE_LENGTH,
        }
    }
}

impl ThresholdConfig {
    /// Build a validated configuration from signed inputs
    pub fn new(min_element_count: i64, min_average_byte_length: i64) -> SimdResult<Self> {
        if min_element_count <= 0 {
            return Err(SimdError::configuration(format!(
                "min_element_count must be > 0, got {min_element_count}"
            )));
        }
        if min_average_byte_length <= 0 {
            return Err(SimdError::configuration(format!(
                "min_average_byte_length must be > 0, got {min_average_byte_length}"
            )));
        }
        let config = Self {
            min_element_count: usize::try_from(min_element_count)
                .map_err(|e| SimdError::configuration(e.to_string()))?,
            min_average_byte_length: usize::try_from(min_average_byte_length)
                .map_err(|e| SimdError::configuration(e.to_string()))?,
        };
        Ok(config)
    }

    /// Reject zero values (possible after deserialization)
    pub fn validate(&self) -> SimdResult<()> {
        if self.min_element_count == 0 {
            return Err(SimdError::configuration("min_element_count must be > 0, got 0"));
        }
        if self.min_average_byte_length == 0 {
            return Err(SimdError::configuration(
                "min_average_byte_length must be > 0, got 0",
            ));
        }
        Ok(())
    }

    /// The pair as `(min_element_count, min_average_byte_length)`
    pub fn as_tuple(&self) -> (usize, usize) {
        (self.min_element_count, self.min_average_byte_length)
    }
}

/// Atomically swappable holder for a [`ThresholdConfig`]
pub struct ThresholdCell {
    current: ArcSwap<ThresholdConfig>,
}

impl ThresholdCell {
    pub fn new(config: ThresholdConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(config),
        }
    }

    /// Current configuration (one atomic load)
    #[inline]
    pub fn snapshot(&self) -> ThresholdConfig {
        **self.current.load()
    }

    /// Validate and install a new configuration as a whole.
    ///
    /// On error the previous configuration stays in effect.
    pub fn replace(&self, config: ThresholdConfig) -> SimdResult<()> {
        if let Err(err) = config.validate() {
            tracing::warn!(?config, %err, "rejected string dispatch thresholds");
            return Err(err);
        }
        let previous = self.current.swap(Arc::new(config));
        tracing::info!(
            min_element_count = config.min_element_count,
            min_average_byte_length = config.min_average_byte_length,
            previous = ?previous.as_tuple(),
            "string dispatch thresholds updated"
        );
        Ok(())
    }
}

impl Default for ThresholdCell {
    fn default() -> Self {
        Self::new(ThresholdConfig::default())
    }
}

impl std::fmt::Debug for ThresholdCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThresholdCell")
            .field("current", &self.snapshot())
            .finish()
    }
}

static THRESHOLDS: OnceLock<ThresholdCell> = OnceLock::new();

/// The process-wide threshold cell
pub fn thresholds() -> &'static ThresholdCell {
    THRESHOLDS.get_or_init(ThresholdCell::default)
}

/// Current process-wide string thresholds
pub fn get_threshold() -> ThresholdConfig {
    thresholds().snapshot()
}

/// Replace the process-wide string thresholds.
///
/// Either value `<= 0` is rejected and the previous pair stays in effect.
pub fn set_threshold(min_element_count: i64, min_average_byte_length: i64) -> SimdResult<()> {
    let config = match ThresholdConfig::new(min_element_count, min_average_byte_length) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                min_element_count,
                min_average_byte_length,
                %err,
                "rejected string dispatch thresholds"
            );
            return Err(err);
        }
    };
    thresholds().replace(config)
}

/// Replace the process-wide string thresholds from a loaded config value
pub fn set_threshold_config(config: ThresholdConfig) -> SimdResult<()> {
    thresholds().replace(config)
}

/// Sizing and metrics parameters for the scratch buffer pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Largest buffer kept in the pool; bigger requests go straight to the heap
    pub max_pooled_bytes: usize,
    /// Buffer sizes allocated up front
    pub warmup_sizes: Vec<usize>,
    /// Buffers allocated per warmup size
    pub warmup_per_size: usize,
    /// Upper bound on idle buffers retained
    pub max_idle_buffers: usize,
    /// Width of one metrics bucket in seconds
    pub metrics_granularity_secs: u64,
    /// Length of the metrics window in seconds
    pub metrics_window_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_pooled_bytes: 64 * 1024,
            warmup_sizes: vec![256, 1024, 4096, 16384, 65536],
            warmup_per_size: 4,
            max_idle_buffers: 64,
            metrics_granularity_secs: 1,
            metrics_window_secs: 10 * 60,
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> SimdResult<()> {
        if self.metrics_granularity_secs == 0 {
            return Err(SimdError::configuration(
                "metrics_granularity_secs must be > 0",
            ));
        }
        if self.metrics_window_secs < self.metrics_granularity_secs {
            return Err(SimdError::configuration(
                "metrics_window_secs must cover at least one bucket",
            ));
        }
        if let Some(size) = self
            .warmup_sizes
            .iter()
            .find(|size| **size > self.max_pooled_bytes)
        {
            return Err(SimdError::configuration(format!(
                "warmup size {size} exceeds max_pooled_bytes {}",
                self.max_pooled_bytes
            )));
        }
        Ok(())
    }

    /// Number of buckets in the metrics ring
    pub fn ring_len(&self) -> usize {
        (self.metrics_window_secs / self.metrics_granularity_secs.max(1)) as usize
    }
}
