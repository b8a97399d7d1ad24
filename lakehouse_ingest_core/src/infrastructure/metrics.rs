// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Process-wide metrics for the ingestion core's extract-stage concurrency.
//! A single [`ConcurrencyMetrics`] instance, sized by `max_workers` at
//! startup, is shared across every run this process executes.

pub mod concurrency_metrics;

pub use concurrency_metrics::{ConcurrencyMetrics, Histogram};
