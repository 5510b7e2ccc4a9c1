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

//! Scratch Buffer Pool
//!
//! Reusable byte buffers for kernels that need a temporary copy of their
//! input (case folding, for instance).
//!
//! ## Sizing
//!
//! ```text
//! request <= max_pooled_bytes  ──► reuse an idle buffer  (hit)
//!                              └─► allocate and pool it later (miss)
//! request >  max_pooled_bytes  ──► plain heap allocation, never pooled (heap fallback)
//! ```
//!
//! ## Metrics
//!
//! Events land in a fixed ring of time buckets (one second each, ten minutes
//! of history by default). Bucket `b` always maps to slot `b % len`, and the
//! clock is read while the ring lock is held, so concurrent recorders never
//! evict a bucket that is still inside the window. Reading the stats sums the
//! buckets inside the window and retires older ones.
//!
//! Both the idle list and the ring sit behind `parking_lot::Mutex`es that are
//! held for the push/pop or counter update only.

use std::ops::{Deref, DerefMut};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::PoolConfig;
use crate::error::SimdResult;

// ============================================================================
// Metrics Ring
// ============================================================================

/// Kind of pool event recorded in the metrics ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolEvent {
    Hit,
    Miss,
    HeapFallback,
}

#[derive(Debug, Clone, Copy, Default)]
struct MetricsBucket {
    /// Bucket number, i.e. unix seconds / granularity
    bucket: u64,
    hits: u64,
    misses: u64,
    heap_fallbacks: u64,
    valid: bool,
}

/// Aggregated pool usage over the metrics window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    pub pool_hits: u64,
    pub pool_misses: u64,
    pub heap_fallbacks: u64,
    /// Oldest bucket inside the window (unix seconds), or the window start
    /// when nothing was recorded
    pub window_start_secs: u64,
    /// Newest bucket inside the window (unix seconds), or now when nothing
    /// was recorded
    pub window_end_secs: u64,
}

impl PoolStats {
    /// Hits over all pooled requests; `None` before any pooled request
    pub fn hit_ratio(&self) -> Option<f64> {
        let pooled = self.pool_hits + self.pool_misses;
        (pooled > 0).then(|| self.pool_hits as f64 / pooled as f64)
    }
}

struct MetricsRing {
    /// Bucket `b` lives in slot `b % slots.len()`
    slots: Vec<MetricsBucket>,
    granularity_secs: u64,
    window_secs: u64,
}

impl MetricsRing {
    fn new(config: &PoolConfig) -> Self {
        Self {
            slots: vec![MetricsBucket::default(); config.ring_len().max(1)],
            granularity_secs: config.metrics_granularity_secs.max(1),
            window_secs: config.metrics_window_secs,
        }
    }

    #[inline]
    fn slot(&self, bucket: u64) -> usize {
        (bucket % self.slots.len() as u64) as usize
    }

    /// Callers may arrive out of timestamp order, so the slot is derived from
    /// the bucket itself. A slot holding an older bucket is recycled; an event
    /// older than the bucket in its slot is outside the ring and dropped.
    fn record(&mut self, event: PoolEvent, now_secs: u64) {
        let bucket = now_secs / self.granularity_secs;
        let idx = self.slot(bucket);
        let current = self.slots[idx];
        if current.valid && current.bucket > bucket {
            return;
        }
        if !current.valid || current.bucket != bucket {
            self.slots[idx] = MetricsBucket {
                bucket,
                valid: true,
                ..MetricsBucket::default()
            };
        }

        let entry = &mut self.slots[idx];
        match event {
            PoolEvent::Hit => entry.hits += 1,
            PoolEvent::Miss => entry.misses += 1,
            PoolEvent::HeapFallback => entry.heap_fallbacks += 1,
        }
    }

    fn snapshot(&mut self, now_secs: u64) -> PoolStats {
        let window_start = now_secs.saturating_sub(self.window_secs);
        let mut stats = PoolStats::default();
        let mut oldest: Option<u64> = None;
        let mut newest: Option<u64> = None;

        for entry in self.slots.iter_mut().filter(|e| e.valid) {
            let entry_secs = entry.bucket * self.granularity_secs;
            if entry_secs < window_start {
                entry.valid = false;
                continue;
            }
            if entry_secs > now_secs {
                continue;
            }
            stats.pool_hits += entry.hits;
            stats.pool_misses += entry.misses;
            stats.heap_fallbacks += entry.heap_fallbacks;
            oldest = Some(oldest.map_or(entry_secs, |o| o.min(entry_secs)));
            newest = Some(newest.map_or(entry_secs, |n| n.max(entry_secs)));
        }

        stats.window_start_secs = oldest.unwrap_or(window_start);
        stats.window_end_secs = newest.unwrap_or(now_secs);
        stats
    }
}

fn unix_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ============================================================================
// Buffer Pool
// ============================================================================

/// Pool of reusable byte buffers with usage metrics
pub struct BufferPool {
    config: PoolConfig,
    idle: Mutex<Vec<Vec<u8>>>,
    metrics: Mutex<MetricsRing>,
}

static GLOBAL_POOL: OnceLock<BufferPool> = OnceLock::new();

impl BufferPool {
    /// Create a pool and pre-allocate its warmup buffers
    pub fn new(config: PoolConfig) -> SimdResult<Self> {
        config.validate()?;
        Ok(Self::warmed(config))
    }

    fn warmed(config: PoolConfig) -> Self {
        let mut idle = Vec::with_capacity(config.max_idle_buffers);
        'warmup: for &size in &config.warmup_sizes {
            for _ in 0..config.warmup_per_size {
                if idle.len() >= config.max_idle_buffers {
                    break 'warmup;
                }
                idle.push(vec![0u8; size]);
            }
        }
        debug!(buffers = idle.len(), max_pooled_bytes = config.max_pooled_bytes, "buffer pool warmed");

        let metrics = Mutex::new(MetricsRing::new(&config));
        Self {
            config,
            idle: Mutex::new(idle),
            metrics,
        }
    }

    /// Process-wide pool with the default configuration
    pub fn global() -> &'static BufferPool {
        GLOBAL_POOL.get_or_init(|| Self::warmed(PoolConfig::default()))
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// A zeroed buffer of exactly `size` bytes, returned to the pool on drop
    pub fn acquire(&self, size: usize) -> PooledBuffer<'_> {
        self.acquire_with(size, None)
    }

    #[cfg(test)]
    pub(crate) fn acquire_at(&self, size: usize, now_secs: u64) -> PooledBuffer<'_> {
        self.acquire_with(size, Some(now_secs))
    }

    /// `at` pins the metrics clock; `None` reads it under the metrics lock
    fn acquire_with(&self, size: usize, at: Option<u64>) -> PooledBuffer<'_> {
        if size > self.config.max_pooled_bytes {
            self.record(PoolEvent::HeapFallback, at);
            trace!(size, "scratch request above pool limit");
            return PooledBuffer {
                pool: self,
                buf: vec![0u8; size],
            };
        }

        let reused = {
            let mut idle = self.idle.lock();
            let found = idle.iter().position(|b| b.capacity() >= size);
            let buf = found.map(|pos| idle.swap_remove(pos));
            buf
        };

        let buf = match reused {
            Some(mut buf) => {
                self.record(PoolEvent::Hit, at);
                // Previous contents never leak into a new borrower
                buf.clear();
                buf.resize(size, 0);
                buf
            }
            None => {
                self.record(PoolEvent::Miss, at);
                vec![0u8; size]
            }
        };
        PooledBuffer { pool: self, buf }
    }

    fn release(&self, buf: Vec<u8>) {
        if buf.capacity() > self.config.max_pooled_bytes {
            return;
        }
        let mut idle = self.idle.lock();
        if idle.len() < self.config.max_idle_buffers {
            idle.push(buf);
        }
    }

    /// Buffers currently waiting for reuse
    pub fn idle_buffers(&self) -> usize {
        self.idle.lock().len()
    }

    fn record(&self, event: PoolEvent, at: Option<u64>) {
        let mut metrics = self.metrics.lock();
        let now_secs = at.unwrap_or_else(unix_now_secs);
        metrics.record(event, now_secs);
    }

    #[cfg(test)]
    pub(crate) fn record_at(&self, event: PoolEvent, now_secs: u64) {
        self.record(event, Some(now_secs));
    }

    /// Usage over the metrics window ending now
    pub fn stats(&self) -> PoolStats {
        let mut metrics = self.metrics.lock();
        metrics.snapshot(unix_now_secs())
    }

    #[cfg(test)]
    pub(crate) fn stats_at(&self, now_secs: u64) -> PoolStats {
        self.metrics.lock().snapshot(now_secs)
    }
}

/// Usage of the process-wide pool
pub fn buffer_pool_stats() -> PoolStats {
    BufferPool::global().stats()
}

/// Scratch buffer borrowed from a [`BufferPool`]
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buf: Vec<u8>,
}

impl Deref for PooledBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_pool() -> BufferPool {
        BufferPool::new(PoolConfig {
            max_pooled_bytes: 1024,
            warmup_sizes: vec![64],
            warmup_per_size: 1,
            max_idle_buffers: 4,
            metrics_granularity_secs: 1,
            metrics_window_secs: 60,
        })
        .unwrap()
    }

    #[test]
    fn test_warmup_and_hit() {
        let pool = small_pool();
        assert_eq!(pool.idle_buffers(), 1);

        let buf = pool.acquire_at(32, 1_000);
        assert_eq!(buf.len(), 32);
        assert!(buf.iter().all(|&b| b == 0));
        assert_eq!(pool.idle_buffers(), 0);
        drop(buf);
        assert_eq!(pool.idle_buffers(), 1);

        let stats = pool.stats_at(1_000);
        assert_eq!((stats.pool_hits, stats.pool_misses, stats.heap_fallbacks), (1, 0, 0));
    }

    #[test]
    fn test_reused_buffer_is_zeroed() {
        let pool = small_pool();
        {
            let mut buf = pool.acquire_at(64, 1_000);
            buf.fill(0xAB);
        }
        let buf = pool.acquire_at(48, 1_000);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_miss_then_pooled() {
        let pool = small_pool();
        let big = pool.acquire_at(512, 1_000);
        assert_eq!(big.len(), 512);
        drop(big);
        assert_eq!(pool.idle_buffers(), 2);

        let again = pool.acquire_at(500, 1_001);
        drop(again);
        let stats = pool.stats_at(1_001);
        assert_eq!(stats.pool_misses, 1);
        assert_eq!(stats.pool_hits, 1);
        assert_eq!(stats.window_start_secs, 1_000);
        assert_eq!(stats.window_end_secs, 1_001);
    }

    #[test]
    fn test_oversize_is_heap_fallback() {
        let pool = small_pool();
        let buf = pool.acquire_at(4096, 1_000);
        assert_eq!(buf.len(), 4096);
        drop(buf);
        // Never pooled
        assert_eq!(pool.idle_buffers(), 1);
        assert_eq!(pool.stats_at(1_000).heap_fallbacks, 1);
    }

    #[test]
    fn test_idle_limit() {
        let pool = small_pool();
        let held: Vec<_> = (0..6).map(|_| pool.acquire_at(128, 1_000)).collect();
        drop(held);
        assert_eq!(pool.idle_buffers(), 4);
    }

    #[test]
    fn test_window_expiry() {
        let pool = small_pool();
        pool.record_at(PoolEvent::Hit, 1_000);
        pool.record_at(PoolEvent::Hit, 1_000);
        pool.record_at(PoolEvent::Miss, 1_030);

        let stats = pool.stats_at(1_030);
        assert_eq!((stats.pool_hits, stats.pool_misses), (2, 1));

        // First bucket falls out of the 60 s window
        let stats = pool.stats_at(1_070);
        assert_eq!((stats.pool_hits, stats.pool_misses), (0, 1));

        let stats = pool.stats_at(5_000);
        assert_eq!(stats, PoolStats {
            window_start_secs: 5_000 - 60,
            window_end_secs: 5_000,
            ..PoolStats::default()
        });
    }

    #[test]
    fn test_ring_wraps_without_losing_recent_buckets() {
        let pool = small_pool();
        // 60 slots; write 150 consecutive seconds
        for t in 0..150u64 {
            pool.record_at(PoolEvent::Miss, 10_000 + t);
        }
        let stats = pool.stats_at(10_149);
        assert_eq!(stats.pool_misses, 60);
        assert_eq!(stats.window_start_secs, 10_149 - 59);
    }

    #[test]
    fn test_interleaved_seconds_keep_every_event() {
        let pool = small_pool();
        // Two recorders straddling a second boundary, arriving alternately
        for i in 0..200u64 {
            pool.record_at(PoolEvent::Miss, 1_000 + i % 2);
        }
        let stats = pool.stats_at(1_001);
        assert_eq!(stats.pool_misses, 200);
        assert_eq!(stats.window_start_secs, 1_000);
        assert_eq!(stats.window_end_secs, 1_001);
    }

    #[test]
    fn test_late_event_lands_in_its_own_bucket() {
        let pool = small_pool();
        pool.record_at(PoolEvent::Hit, 2_005);
        pool.record_at(PoolEvent::Miss, 2_004);
        pool.record_at(PoolEvent::Hit, 2_005);
        pool.record_at(PoolEvent::HeapFallback, 2_003);

        let stats = pool.stats_at(2_005);
        assert_eq!(
            (stats.pool_hits, stats.pool_misses, stats.heap_fallbacks),
            (2, 1, 1)
        );

        // A full ring older than the slot's bucket is dropped
        pool.record_at(PoolEvent::Miss, 2_005 - 60);
        assert_eq!(pool.stats_at(2_005).pool_misses, 1);
    }

    #[test]
    fn test_concurrent_acquires_are_all_counted() {
        let pool = small_pool();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..250 {
                        drop(pool.acquire(2048));
                    }
                });
            }
        });
        assert_eq!(pool.stats().heap_fallbacks, 2_000);
    }

    #[test]
    fn test_hit_ratio() {
        let stats = PoolStats {
            pool_hits: 3,
            pool_misses: 1,
            ..PoolStats::default()
        };
        assert_eq!(stats.hit_ratio(), Some(0.75));
        assert_eq!(PoolStats::default().hit_ratio(), None);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = BufferPool::new(PoolConfig {
            metrics_granularity_secs: 0,
            ..PoolConfig::default()
        })
        .err()
        .unwrap();
        assert!(err.is_configuration());
    }
}
