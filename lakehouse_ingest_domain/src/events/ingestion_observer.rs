use crate::value_objects::Category;
use async_trait::async_trait;

/// Hooks for monitoring an ingestion run as it progresses through the
/// pipeline. All methods default to no-ops so a caller only needs to
/// implement the handful it cares about.
#[async_trait]
pub trait IngestionObserver: Send + Sync {
    /// Called once the crawl stage has enumerated the file set.
    async fn on_crawl_completed(&self, _file_count: usize) {}

    /// Called after a file has been classified.
    async fn on_file_classified(&self, _file_id: &str, _category: Category, _confidence: f32) {}

    /// Called when a single file finishes processing, successfully or not.
    async fn on_file_completed(&self, _file_id: &str, _succeeded: bool) {}

    /// Called periodically with coarse run-wide progress.
    async fn on_progress_update(&self, _files_done: usize, _files_total: usize) {}

    /// Called once the run reaches a terminal state.
    async fn on_run_completed(&self, _run_id: &str, _succeeded: bool) {}
}

/// An observer that does nothing; the default when no caller supplies one.
pub struct NoOpObserver;

#[async_trait]
impl IngestionObserver for NoOpObserver {}
