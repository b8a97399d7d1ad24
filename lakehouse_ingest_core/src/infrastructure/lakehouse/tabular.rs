use async_trait::async_trait;
use chrono::Utc;
use lakehouse_ingest_domain::entities::TabularRecord;
use lakehouse_ingest_domain::error::IngestionError;
use lakehouse_ingest_domain::repositories::TabularStore;
use lakehouse_ingest_domain::value_objects::{Category, CustomerId};
use sqlx::migrate::MigrateDatabase;
use sqlx::SqlitePool;
use tracing::{debug, info};

/// `TabularStore` backed by a per-customer SQLite database. One table per
/// `(category, record-kind)` pair, created lazily on first write.
pub struct SqlxTabularStore {
    pool: SqlitePool,
}

impl SqlxTabularStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, IngestionError> {
        if !sqlx::Sqlite::database_exists(database_url)
            .await
            .map_err(|e| IngestionError::DatabaseError(e.to_string()))?
        {
            sqlx::Sqlite::create_database(database_url)
                .await
                .map_err(|e| IngestionError::DatabaseError(e.to_string()))?;
        }
        let pool = SqlitePool::connect(database_url)
            .await
            .map_err(|e| IngestionError::DatabaseError(e.to_string()))?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl TabularStore for SqlxTabularStore {
    async fn ensure_schema(&self, customer_id: &CustomerId, category: Category) -> Result<(), IngestionError> {
        debug!(customer = %customer_id, %category, "ensuring tabular schema");
        let documents_table = format!("{category}_documents");
        let chunks_table = format!("{category}_chunks");

        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {documents_table} (
                document_id TEXT PRIMARY KEY,
                customer_id TEXT,
                filename TEXT NOT NULL,
                category TEXT NOT NULL,
                ingested_at TEXT NOT NULL,
                metadata TEXT NOT NULL
            )"
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| IngestionError::DatabaseError(e.to_string()))?;

        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {chunks_table} (
                chunk_id TEXT PRIMARY KEY,
                document_id TEXT NOT NULL,
                customer_id TEXT,
                ordinal INTEGER NOT NULL,
                text TEXT NOT NULL
            )"
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| IngestionError::DatabaseError(e.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS products (
                sku TEXT PRIMARY KEY,
                customer_id TEXT,
                name TEXT NOT NULL,
                price TEXT,
                currency TEXT,
                metadata TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| IngestionError::DatabaseError(e.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS syndication_products (
                sku TEXT PRIMARY KEY,
                customer_id TEXT,
                channel TEXT NOT NULL,
                published_at TEXT,
                metadata TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| IngestionError::DatabaseError(e.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS data_quality_audit (
                document_id TEXT,
                customer_id TEXT,
                issue TEXT NOT NULL,
                detected_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| IngestionError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn write_batch(&self, customer_id: &CustomerId, records: Vec<TabularRecord>) -> Result<usize, IngestionError> {
        let mut written = 0;
        for record in records {
            if !record.has_primary_key() {
                debug!(customer = %customer_id, "dropping tabular record with no primary key");
                continue;
            }
            match record {
                TabularRecord::Document(row) => {
                    sqlx::query(&format!(
                        "INSERT OR REPLACE INTO {}_documents (document_id, customer_id, filename, category, ingested_at, metadata) VALUES (?, ?, ?, ?, ?, ?)",
                        row.category
                    ))
                    .bind(&row.document_id)
                    .bind(customer_id.as_str())
                    .bind(&row.filename)
                    .bind(row.category.to_string())
                    .bind(row.ingested_at.to_rfc3339())
                    .bind(row.metadata.to_string())
                    .execute(&self.pool)
                    .await
                    .map_err(|e| IngestionError::DatabaseError(e.to_string()))?;
                }
                TabularRecord::Chunk(row) => {
                    let table = format!("{}_chunks", row.category);
                    sqlx::query(&format!(
                        "INSERT OR REPLACE INTO {table} (chunk_id, document_id, customer_id, ordinal, text) VALUES (?, ?, ?, ?, ?)"
                    ))
                    .bind(&row.chunk_id)
                    .bind(&row.document_id)
                    .bind(customer_id.as_str())
                    .bind(row.ordinal as i64)
                    .bind(&row.text)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| IngestionError::DatabaseError(e.to_string()))?;
                }
                TabularRecord::Product(row) => {
                    sqlx::query(
                        "INSERT OR REPLACE INTO products (sku, customer_id, name, price, currency, metadata) VALUES (?, ?, ?, ?, ?, ?)",
                    )
                    .bind(&row.sku)
                    .bind(customer_id.as_str())
                    .bind(&row.name)
                    .bind(row.price.map(|p| p.to_string()))
                    .bind(&row.currency)
                    .bind(serde_json::to_string(&row.metadata).unwrap_or_default())
                    .execute(&self.pool)
                    .await
                    .map_err(|e| IngestionError::DatabaseError(e.to_string()))?;
                }
                TabularRecord::SyndicationProduct(row) => {
                    sqlx::query(
                        "INSERT OR REPLACE INTO syndication_products (sku, customer_id, channel, published_at, metadata) VALUES (?, ?, ?, ?, ?)",
                    )
                    .bind(&row.sku)
                    .bind(customer_id.as_str())
                    .bind(&row.channel)
                    .bind(row.published_at.map(|t| t.to_rfc3339()))
                    .bind(serde_json::to_string(&row.metadata).unwrap_or_default())
                    .execute(&self.pool)
                    .await
                    .map_err(|e| IngestionError::DatabaseError(e.to_string()))?;
                }
                TabularRecord::DataQualityAudit(row) => {
                    sqlx::query(
                        "INSERT INTO data_quality_audit (document_id, customer_id, issue, detected_at) VALUES (?, ?, ?, ?)",
                    )
                    .bind(&row.document_id)
                    .bind(customer_id.as_str())
                    .bind(&row.issue)
                    .bind(row.detected_at.to_rfc3339())
                    .execute(&self.pool)
                    .await
                    .map_err(|e| IngestionError::DatabaseError(e.to_string()))?;
                }
            }
            written += 1;
        }
        info!(customer = %customer_id, written, "wrote tabular batch");
        Ok(written)
    }

    /// SQLite has no per-table compaction; `VACUUM` rebuilds the whole
    /// database file and is the closest analog, so every call compacts the
    /// customer's full database rather than just `table_name`.
    async fn compact(&self, customer_id: &CustomerId, table_name: &str) -> Result<(), IngestionError> {
        debug!(customer = %customer_id, table_name, "running VACUUM for tabular compaction");
        sqlx::query("VACUUM").execute(&self.pool).await.map_err(|e| IngestionError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    /// Deletes rows older than `retention_days`, keyed off whichever
    /// timestamp column `table_name` carries (`ingested_at` for document
    /// tables, `detected_at` for the audit table). Tables with no
    /// timestamp column (chunk and standard product tables) have no
    /// retention concept and this is a no-op.
    async fn vacuum(&self, customer_id: &CustomerId, table_name: &str, retention_days: u32) -> Result<(), IngestionError> {
        let timestamp_column = if table_name.ends_with("_documents") {
            Some("ingested_at")
        } else if table_name == "data_quality_audit" {
            Some("detected_at")
        } else {
            None
        };
        let Some(column) = timestamp_column else {
            debug!(customer = %customer_id, table_name, "vacuum is a no-op for tables with no retention timestamp");
            return Ok(());
        };

        let cutoff = Utc::now() - chrono::Duration::days(retention_days as i64);
        sqlx::query(&format!("DELETE FROM {table_name} WHERE {column} < ?"))
            .bind(cutoff.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| IngestionError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lakehouse_ingest_domain::entities::tabular_record::ProductRow;
    use std::collections::HashMap;

    async fn in_memory_store() -> SqlxTabularStore {
        SqlxTabularStore::new(SqlitePool::connect(":memory:").await.unwrap())
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let store = in_memory_store().await;
        let customer = CustomerId::new("acme");
        store.ensure_schema(&customer, Category::Tax).await.unwrap();
        store.ensure_schema(&customer, Category::Tax).await.unwrap();
    }

    #[tokio::test]
    async fn writing_a_product_row_round_trips() {
        let store = in_memory_store().await;
        let customer = CustomerId::new("acme");
        store.ensure_schema(&customer, Category::Products).await.unwrap();
        let written = store
            .write_batch(
                &customer,
                vec![TabularRecord::Product(ProductRow {
                    sku: "SKU-1".into(),
                    customer_id: Some(customer.clone()),
                    name: "Widget".into(),
                    price: None,
                    currency: None,
                    metadata: HashMap::new(),
                })],
            )
            .await
            .unwrap();
        assert_eq!(written, 1);
    }

    #[tokio::test]
    async fn chunk_rows_land_in_their_own_categorys_table() {
        use lakehouse_ingest_domain::entities::tabular_record::ChunkRow;

        let store = in_memory_store().await;
        let customer = CustomerId::new("acme");
        store.ensure_schema(&customer, Category::Products).await.unwrap();
        let written = store
            .write_batch(
                &customer,
                vec![TabularRecord::Chunk(ChunkRow {
                    chunk_id: "c1".into(),
                    document_id: "d1".into(),
                    customer_id: Some(customer.clone()),
                    category: Category::Products,
                    ordinal: 0,
                    text: "chunk text".into(),
                })],
            )
            .await
            .unwrap();
        assert_eq!(written, 1);

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products_chunks").fetch_one(&store.pool).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn compact_and_vacuum_run_without_error() {
        let store = in_memory_store().await;
        let customer = CustomerId::new("acme");
        store.ensure_schema(&customer, Category::Tax).await.unwrap();
        store.compact(&customer, "tax_documents").await.unwrap();
        store.vacuum(&customer, "tax_documents", 30).await.unwrap();
        store.vacuum(&customer, "tax_chunks", 30).await.unwrap();
    }
}
