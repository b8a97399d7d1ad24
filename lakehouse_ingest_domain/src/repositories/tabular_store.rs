use crate::entities::TabularRecord;
use crate::error::IngestionError;
use crate::value_objects::{Category, CustomerId};
use async_trait::async_trait;

/// Structured, row-oriented storage for documents, chunks, and the
/// standard product tables. One table per `(category, record kind)` pair,
/// scoped per tenant at the schema or row level depending on deployment
/// mode.
#[async_trait]
pub trait TabularStore: Send + Sync {
    async fn ensure_schema(&self, customer_id: &CustomerId, category: Category) -> Result<(), IngestionError>;

    /// Writes a batch of records. Rows failing `TabularRecord::has_primary_key`
    /// must be rejected before this is called - the store is not
    /// responsible for re-validating that invariant.
    async fn write_batch(&self, customer_id: &CustomerId, records: Vec<TabularRecord>) -> Result<usize, IngestionError>;

    /// Rewrites small files in `table_name` into fewer, larger ones. A
    /// no-op on backends with no concept of file fragmentation.
    async fn compact(&self, customer_id: &CustomerId, table_name: &str) -> Result<(), IngestionError>;

    /// Removes files in `table_name` past the retention window, expressed
    /// in days. A no-op on backends with no file-level retention.
    async fn vacuum(&self, customer_id: &CustomerId, table_name: &str, retention_days: u32) -> Result<(), IngestionError>;
}
