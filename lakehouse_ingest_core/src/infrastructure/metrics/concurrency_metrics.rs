// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Concurrency metrics for the extract stage's worker semaphore: how many
//! extract slots are in use, how long files waited for one, and a running
//! count of files processed and failed for the currently executing run.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Latency histogram with fixed millisecond buckets. Averages hide tail
/// latency; this keeps enough of the distribution to answer "is extraction
/// wait time actually bad, or is one slow file skewing the average."
#[derive(Debug)]
pub struct Histogram {
    buckets: Vec<AtomicU64>,
    bucket_boundaries: Vec<u64>,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    pub fn new() -> Self {
        let bucket_boundaries = vec![1, 5, 10, 50, 100, 1000];
        let buckets = bucket_boundaries.iter().map(|_| AtomicU64::new(0)).chain(std::iter::once(AtomicU64::new(0))).collect();
        Self { buckets, bucket_boundaries }
    }

    pub fn record(&self, value_ms: u64) {
        let bucket_idx = self.bucket_boundaries.iter().position(|&boundary| value_ms < boundary).unwrap_or(self.bucket_boundaries.len());
        self.buckets[bucket_idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.buckets.iter().map(|b| b.load(Ordering::Relaxed)).sum()
    }

    pub fn percentile(&self, p: f64) -> u64 {
        let total = self.count();
        if total == 0 {
            return 0;
        }
        let target = (((total as f64) * p) / 100.0) as u64;
        let mut cumulative = 0u64;
        for (i, bucket) in self.buckets.iter().enumerate() {
            cumulative += bucket.load(Ordering::Relaxed);
            if cumulative >= target {
                return if i < self.bucket_boundaries.len() { self.bucket_boundaries[i] } else { 1000 };
            }
        }
        0
    }

    pub fn reset(&self) {
        for bucket in &self.buckets {
            bucket.store(0, Ordering::Relaxed);
        }
    }
}

/// Per-process concurrency metrics for the ingestion pipeline's extract
/// stage. One instance lives for the process and is updated across runs;
/// callers wanting per-run numbers should read `IngestionRun` instead.
#[derive(Debug)]
pub struct ConcurrencyMetrics {
    extract_slots_available: AtomicUsize,
    extract_slots_total: usize,
    extract_wait_total_ms: AtomicU64,
    extract_wait_histogram: Mutex<Histogram>,
    active_extract_tasks: AtomicUsize,
    tasks_spawned: AtomicU64,
    tasks_completed: AtomicU64,
}

impl ConcurrencyMetrics {
    pub fn new(extract_slots_total: usize) -> Self {
        Self {
            extract_slots_available: AtomicUsize::new(extract_slots_total),
            extract_slots_total,
            extract_wait_total_ms: AtomicU64::new(0),
            extract_wait_histogram: Mutex::new(Histogram::new()),
            active_extract_tasks: AtomicUsize::new(0),
            tasks_spawned: AtomicU64::new(0),
            tasks_completed: AtomicU64::new(0),
        }
    }

    pub fn update_extract_slots_available(&self, available: usize) {
        self.extract_slots_available.store(available, Ordering::Relaxed);
    }

    pub fn extract_slots_available(&self) -> usize {
        self.extract_slots_available.load(Ordering::Relaxed)
    }

    pub fn extract_saturation_percent(&self) -> f64 {
        let available = self.extract_slots_available.load(Ordering::Relaxed);
        let in_use = self.extract_slots_total.saturating_sub(available);
        ((in_use as f64) / (self.extract_slots_total.max(1) as f64)) * 100.0
    }

    pub fn record_extract_wait(&self, duration: Duration) {
        let ms = duration.as_millis() as u64;
        self.extract_wait_total_ms.fetch_add(ms, Ordering::Relaxed);
        if let Ok(hist) = self.extract_wait_histogram.lock() {
            hist.record(ms);
        }
    }

    pub fn extract_wait_p50(&self) -> u64 {
        self.extract_wait_histogram.lock().map(|h| h.percentile(50.0)).unwrap_or(0)
    }

    pub fn extract_wait_p99(&self) -> u64 {
        self.extract_wait_histogram.lock().map(|h| h.percentile(99.0)).unwrap_or(0)
    }

    pub fn task_started(&self) {
        self.active_extract_tasks.fetch_add(1, Ordering::Relaxed);
        self.tasks_spawned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn task_completed(&self) {
        self.active_extract_tasks.fetch_sub(1, Ordering::Relaxed);
        self.tasks_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn active_tasks(&self) -> usize {
        self.active_extract_tasks.load(Ordering::Relaxed)
    }

    pub fn tasks_spawned(&self) -> u64 {
        self.tasks_spawned.load(Ordering::Relaxed)
    }

    pub fn tasks_completed(&self) -> u64 {
        self.tasks_completed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_percentiles_track_recorded_values() {
        let hist = Histogram::new();
        for _ in 0..9 {
            hist.record(2);
        }
        hist.record(500);
        assert_eq!(hist.percentile(50.0), 5);
        assert_eq!(hist.count(), 10);
    }

    #[test]
    fn saturation_reflects_slots_in_use() {
        let metrics = ConcurrencyMetrics::new(10);
        metrics.update_extract_slots_available(2);
        assert_eq!(metrics.extract_saturation_percent(), 80.0);
    }

    #[test]
    fn task_lifecycle_counters_track_active_and_completed() {
        let metrics = ConcurrencyMetrics::new(4);
        metrics.task_started();
        metrics.task_started();
        assert_eq!(metrics.active_tasks(), 2);
        metrics.task_completed();
        assert_eq!(metrics.active_tasks(), 1);
        assert_eq!(metrics.tasks_completed(), 1);
    }
}
