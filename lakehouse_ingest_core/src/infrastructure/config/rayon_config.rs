// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Global Rayon thread pool for the CPU-bound slice of the pipeline:
//! chunking, entity extraction, and embedding partition-size calculation.
//! I/O-bound stages (crawl, extract, classify, load) stay on the `tokio`
//! executor; anything that's pure computation over already-read text is
//! dispatched here via `tokio::task::spawn_blocking` + `rayon::scope`.

use lakehouse_ingest_domain::error::IngestionError;
use std::sync::Arc;

/// A single pool sized to the available cores, named for profiling.
/// The teacher's split between a CPU-bound and a mixed-workload pool
/// doesn't carry over here - there's only one kind of CPU-bound work in
/// this pipeline, not a compression/encryption split - so one pool
/// suffices.
pub struct RayonPoolManager {
    pool: Arc<rayon::ThreadPool>,
}

impl RayonPoolManager {
    pub fn new() -> Result<Self, IngestionError> {
        let cores = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(cores)
            .thread_name(|i| format!("rayon-cpu-{i}"))
            .build()
            .map_err(|e| IngestionError::internal_error(format!("failed to create rayon pool: {e}")))?;
        Ok(Self { pool: Arc::new(pool) })
    }

    pub fn pool(&self) -> &Arc<rayon::ThreadPool> {
        &self.pool
    }

    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }
}

/// Global pool instance, initialized once at first access.
#[allow(clippy::expect_used)]
pub static RAYON_POOLS: std::sync::LazyLock<RayonPoolManager> =
    std::sync::LazyLock::new(|| RayonPoolManager::new().expect("failed to initialize rayon pool"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_has_at_least_one_thread() {
        let manager = RayonPoolManager::new().unwrap();
        assert!(manager.thread_count() > 0);
    }

    #[test]
    fn global_pool_is_reachable() {
        assert!(RAYON_POOLS.pool().current_num_threads() > 0);
    }
}
