// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Observability service: tracks run-level throughput (files/sec) and
//! error rate across the process's lifetime and turns them into a health
//! score and a bounded alert list, the same shape
//! `infrastructure::metrics::ConcurrencyMetrics` uses for the extract
//! stage's own counters but aggregated at the operation level instead of
//! the worker-slot level.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct ObservabilityService {
    performance_tracker: Arc<RwLock<PerformanceTracker>>,
    alert_thresholds: AlertThresholds,
}

#[derive(Debug, Clone)]
pub struct PerformanceTracker {
    pub active_operations: u32,
    pub total_operations: u64,
    pub average_files_per_second: f64,
    pub peak_files_per_second: f64,
    pub error_rate_percent: f64,
    pub started_at: Instant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub max_error_rate_percent: f64,
    pub min_files_per_second: f64,
    pub max_concurrent_operations: u32,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            max_error_rate_percent: 5.0,
            min_files_per_second: 0.1,
            max_concurrent_operations: 10,
        }
    }
}

impl Default for PerformanceTracker {
    fn default() -> Self {
        Self {
            active_operations: 0,
            total_operations: 0,
            average_files_per_second: 0.0,
            peak_files_per_second: 0.0,
            error_rate_percent: 0.0,
            started_at: Instant::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemHealth {
    pub status: HealthStatus,
    pub score: f64,
    pub active_operations: u32,
    pub files_per_second: f64,
    pub error_rate_percent: f64,
    pub uptime_seconds: u64,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub message: String,
    pub metric_name: String,
    pub current_value: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl ObservabilityService {
    pub fn new() -> Self {
        Self {
            performance_tracker: Arc::new(RwLock::new(PerformanceTracker::default())),
            alert_thresholds: AlertThresholds::default(),
        }
    }

    pub fn with_thresholds(alert_thresholds: AlertThresholds) -> Self {
        Self {
            performance_tracker: Arc::new(RwLock::new(PerformanceTracker::default())),
            alert_thresholds,
        }
    }

    /// Begins tracking one ingestion run. The returned guard records
    /// against this service if dropped without `complete` being called,
    /// treating an abandoned tracker as a failed operation.
    pub async fn start_run(&self, run_id: &str) -> RunTracker {
        let mut tracker = self.performance_tracker.write().await;
        tracker.active_operations += 1;
        tracker.total_operations += 1;
        debug!(run_id, active = tracker.active_operations, "run started");

        RunTracker {
            run_id: run_id.to_string(),
            start_time: Instant::now(),
            service: self.clone(),
            completed: std::sync::atomic::AtomicBool::new(false),
        }
    }

    async fn complete_run(&self, run_id: &str, duration: Duration, succeeded: bool, files_processed: usize) {
        let mut tracker = self.performance_tracker.write().await;
        tracker.active_operations = tracker.active_operations.saturating_sub(1);

        let files_per_second = if duration.as_secs_f64() > 0.0 { files_processed as f64 / duration.as_secs_f64() } else { 0.0 };
        if files_per_second > tracker.peak_files_per_second {
            tracker.peak_files_per_second = files_per_second;
        }
        tracker.average_files_per_second = (tracker.average_files_per_second + files_per_second) / 2.0;

        let total_ops = tracker.total_operations as f64;
        let error_contribution = if succeeded { 0.0 } else { 100.0 };
        tracker.error_rate_percent = (tracker.error_rate_percent * (total_ops - 1.0) + error_contribution) / total_ops;

        info!(run_id, succeeded, files_per_second, "run completed");
        self.check_alerts(&tracker);
    }

    pub async fn system_health(&self) -> SystemHealth {
        let tracker = self.performance_tracker.read().await;
        let uptime = tracker.started_at.elapsed().as_secs();

        let mut score: f64 = 100.0;
        let mut alerts = Vec::new();

        if tracker.error_rate_percent > self.alert_thresholds.max_error_rate_percent {
            score -= 30.0;
            alerts.push(Alert {
                severity: AlertSeverity::Warning,
                message: format!("error rate {:.1}% exceeds threshold", tracker.error_rate_percent),
                metric_name: "error_rate_percent".to_string(),
                current_value: tracker.error_rate_percent,
                threshold: self.alert_thresholds.max_error_rate_percent,
            });
        }
        if tracker.total_operations > 0 && tracker.average_files_per_second < self.alert_thresholds.min_files_per_second {
            score -= 20.0;
            alerts.push(Alert {
                severity: AlertSeverity::Warning,
                message: format!("throughput {:.2} files/s below threshold", tracker.average_files_per_second),
                metric_name: "files_per_second".to_string(),
                current_value: tracker.average_files_per_second,
                threshold: self.alert_thresholds.min_files_per_second,
            });
        }

        let status = if score >= 90.0 {
            HealthStatus::Healthy
        } else if score >= 70.0 {
            HealthStatus::Warning
        } else {
            HealthStatus::Critical
        };

        SystemHealth {
            status,
            score,
            active_operations: tracker.active_operations,
            files_per_second: tracker.average_files_per_second,
            error_rate_percent: tracker.error_rate_percent,
            uptime_seconds: uptime,
            alerts,
        }
    }

    fn check_alerts(&self, tracker: &PerformanceTracker) {
        if tracker.error_rate_percent > self.alert_thresholds.max_error_rate_percent {
            warn!(error_rate = tracker.error_rate_percent, "elevated ingestion error rate");
        }
        if tracker.active_operations > self.alert_thresholds.max_concurrent_operations {
            warn!(active = tracker.active_operations, "high number of concurrent ingestion runs");
        }
    }
}

impl Default for ObservabilityService {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for one run's observability tracking. `complete` must be
/// called on the happy path; an uncompleted guard records itself as
/// failed on drop, so a panicked or abandoned run doesn't silently vanish
/// from the error rate.
pub struct RunTracker {
    run_id: String,
    start_time: Instant,
    service: ObservabilityService,
    completed: std::sync::atomic::AtomicBool,
}

impl RunTracker {
    pub async fn complete(self, succeeded: bool, files_processed: usize) {
        self.completed.store(true, std::sync::atomic::Ordering::Relaxed);
        let duration = self.start_time.elapsed();
        self.service.complete_run(&self.run_id, duration, succeeded, files_processed).await;
    }
}

impl Drop for RunTracker {
    fn drop(&mut self) {
        if !self.completed.load(std::sync::atomic::Ordering::Relaxed) {
            let service = self.service.clone();
            let run_id = self.run_id.clone();
            let duration = self.start_time.elapsed();
            tokio::spawn(async move {
                service.complete_run(&run_id, duration, false, 0).await;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn a_completed_run_updates_average_throughput() {
        let service = ObservabilityService::new();
        let tracker = service.start_run("run-1").await;
        tracker.complete(true, 10).await;

        let health = service.system_health().await;
        assert_eq!(health.active_operations, 0);
    }

    #[tokio::test]
    async fn repeated_failures_raise_the_error_rate() {
        let service = ObservabilityService::new();
        for i in 0..5 {
            let tracker = service.start_run(&format!("run-{i}")).await;
            tracker.complete(false, 0).await;
        }
        let health = service.system_health().await;
        assert!(health.error_rate_percent > 50.0);
        assert!(matches!(health.status, HealthStatus::Critical));
    }
}
