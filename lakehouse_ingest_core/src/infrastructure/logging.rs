// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Structured logging and run-level observability. Log records go through
//! `tracing`; `ObservabilityService` turns the run outcomes those records
//! describe into throughput/error-rate metrics and a health score.

pub mod observability;

pub use observability::{AlertThresholds, HealthStatus, ObservabilityService, RunTracker, SystemHealth};

/// Installs the process-wide `tracing` subscriber. Honors `RUST_LOG` for
/// level filtering; falls back to `info` when unset. JSON output in
/// managed deployments (machine-parsed), human-readable in development -
/// mirrors the deployment-mode split the Path Resolver already makes.
pub fn init_tracing(json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        let _ = subscriber.json().try_init();
    } else {
        let _ = subscriber.try_init();
    }
}
