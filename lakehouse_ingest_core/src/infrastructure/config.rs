// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Infrastructure configuration: the ingestion core's own tunables
//! (concurrency, timeouts, batch sizes), loaded from environment variables
//! with the same tolerant, default-on-absence behavior
//! `DeploymentContext::parse_descriptor` uses for per-customer descriptors.

pub mod rayon_config;

use crate::application::orchestrator::IngestionOptions;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Builds an `IngestionOptions` from the process environment, falling back
/// to `IngestionOptions::default()` for anything unset or unparseable.
///
/// Recognized variables:
/// - `INGEST_MAX_WORKERS`
/// - `INGEST_MAX_CRAWL_DEPTH`
/// - `INGEST_MAX_FILE_BYTES`
/// - `INGEST_EMBED_BATCH_SIZE`
/// - `INGEST_ENABLE_STRUCTURED_EXTRACTION`
/// - `INGEST_ENABLE_ENTITY_EXTRACTION`
/// - `INGEST_ENABLE_METADATA_ENRICHMENT`
/// - `INGEST_ADAPTIVE_HANDLER_TIMEOUT_SECS`
/// - `INGEST_CLASSIFICATION_TIMEOUT_SECS`
pub fn options_from_env() -> IngestionOptions {
    let defaults = IngestionOptions::default();
    IngestionOptions {
        max_workers: env_usize("INGEST_MAX_WORKERS", defaults.max_workers),
        max_crawl_depth: env_usize("INGEST_MAX_CRAWL_DEPTH", defaults.max_crawl_depth as usize) as u32,
        max_file_bytes: env_u64("INGEST_MAX_FILE_BYTES", defaults.max_file_bytes),
        embed_batch_size: env_usize("INGEST_EMBED_BATCH_SIZE", defaults.embed_batch_size),
        enable_structured_extraction: env_bool("INGEST_ENABLE_STRUCTURED_EXTRACTION", defaults.enable_structured_extraction),
        enable_entity_extraction: env_bool("INGEST_ENABLE_ENTITY_EXTRACTION", defaults.enable_entity_extraction),
        enable_metadata_enrichment: env_bool("INGEST_ENABLE_METADATA_ENRICHMENT", defaults.enable_metadata_enrichment),
        adaptive_handler_timeout: Duration::from_secs(env_u64("INGEST_ADAPTIVE_HANDLER_TIMEOUT_SECS", defaults.adaptive_handler_timeout.as_secs())),
        classification_timeout: Duration::from_secs(env_u64("INGEST_CLASSIFICATION_TIMEOUT_SECS", defaults.classification_timeout.as_secs())),
        cancel: Arc::new(AtomicBool::new(false)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_environment_falls_back_to_defaults() {
        std::env::remove_var("INGEST_MAX_WORKERS");
        let options = options_from_env();
        assert_eq!(options.max_workers, IngestionOptions::default().max_workers);
    }
}
