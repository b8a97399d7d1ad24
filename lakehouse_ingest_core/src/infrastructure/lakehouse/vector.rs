use async_trait::async_trait;
use lakehouse_ingest_domain::entities::EmbeddingRecord;
use lakehouse_ingest_domain::error::IngestionError;
use lakehouse_ingest_domain::repositories::vector_store::{index_params_for, VectorIndexParams};
use lakehouse_ingest_domain::repositories::VectorStore;
use lakehouse_ingest_domain::value_objects::{Category, CustomerId, EmbeddingVector};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// A single customer's `embeddings` table, kept in insertion order so
/// `search` results can report stable indices if ever needed. Rows from
/// every category live in the same table; `category` is a scalar field on
/// `EmbeddingRecord` used as a search predicate, not a partition key.
#[derive(Default)]
struct Table {
    rows: Vec<EmbeddingRecord>,
}

/// In-process `VectorStore`. No ANN index is actually built - `create_index`
/// only computes and records the sizing parameters a real IVF-PQ index would
/// use, and `search` falls back to a brute-force cosine scan. Adequate for
/// the row counts a single-tenant deployment sees; swapping in a real ANN
/// backend is a drop-in replacement of this one file.
pub struct FlatVectorStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl FlatVectorStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
        }
    }

    fn key(customer_id: &CustomerId) -> String {
        customer_id.as_str().to_string()
    }
}

impl Default for FlatVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for FlatVectorStore {
    async fn insert_batch(&self, records: Vec<EmbeddingRecord>) -> Result<usize, IngestionError> {
        let mut tables = self.tables.write();
        let mut inserted = 0;
        for record in records {
            let table = tables.entry(Self::key(&record.customer_id)).or_default();
            if let Some(existing) = table.rows.first() {
                if existing.vector.dimension() != record.vector.dimension() {
                    return Err(IngestionError::fatal_invariant(format!(
                        "embedding dimension mismatch: table has {}, record has {}",
                        existing.vector.dimension(),
                        record.vector.dimension()
                    )));
                }
            }
            table.rows.push(record);
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn create_index(&self, customer_id: &CustomerId, row_count: usize, dimension: usize) -> Result<VectorIndexParams, IngestionError> {
        let params = index_params_for(row_count, dimension);
        debug!(customer = %customer_id, ?params, "computed vector index sizing");
        Ok(params)
    }

    async fn search(
        &self,
        customer_id: &CustomerId,
        query: &[f32],
        top_k: usize,
        category: Option<Category>,
    ) -> Result<Vec<(String, f32)>, IngestionError> {
        let query_vector = EmbeddingVector::new(query.to_vec()).map_err(IngestionError::fatal_invariant)?;
        let tables = self.tables.read();
        let Some(table) = tables.get(&Self::key(customer_id)) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<(String, f32)> = table
            .rows
            .iter()
            .filter(|row| category.is_none_or(|c| row.category == c))
            .filter_map(|row| row.vector.cosine_similarity(&query_vector).map(|sim| (row.chunk_id.clone(), sim)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn delete_by_document_id(&self, customer_id: &CustomerId, document_id: &str) -> Result<usize, IngestionError> {
        let mut tables = self.tables.write();
        let Some(table) = tables.get_mut(&Self::key(customer_id)) else {
            return Ok(0);
        };
        let before = table.rows.len();
        table.rows.retain(|row| row.document_id != document_id);
        Ok(before - table.rows.len())
    }

    async fn delete_by_category(&self, customer_id: &CustomerId, category: Category) -> Result<usize, IngestionError> {
        let mut tables = self.tables.write();
        let Some(table) = tables.get_mut(&Self::key(customer_id)) else {
            return Ok(0);
        };
        let before = table.rows.len();
        table.rows.retain(|row| row.category != category);
        Ok(before - table.rows.len())
    }

    async fn compact(&self, customer_id: &CustomerId) -> Result<(), IngestionError> {
        // The in-memory backend never leaves dead space behind a delete -
        // `Vec::retain` already frees the slot. Kept as an explicit no-op so
        // callers can schedule compaction uniformly across backends.
        debug!(customer = %customer_id, "compact is a no-op for the in-memory vector store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(chunk_id: &str, customer: &CustomerId, category: Category, vector: Vec<f32>) -> EmbeddingRecord {
        EmbeddingRecord {
            chunk_id: chunk_id.to_string(),
            document_id: "doc-1".to_string(),
            customer_id: customer.clone(),
            category,
            ordinal: 0,
            text: "sample".to_string(),
            vector: EmbeddingVector::new(vector).unwrap(),
        }
    }

    #[tokio::test]
    async fn search_ranks_by_cosine_similarity_descending() {
        let store = FlatVectorStore::new();
        let customer = CustomerId::new("acme");
        store
            .insert_batch(vec![
                record("a", &customer, Category::Tax, vec![1.0, 0.0]),
                record("b", &customer, Category::Tax, vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let results = store.search(&customer, &[1.0, 0.1], 2, None).await.unwrap();
        assert_eq!(results[0].0, "a");
    }

    #[tokio::test]
    async fn search_spans_every_category_in_one_table_unless_filtered() {
        let store = FlatVectorStore::new();
        let customer = CustomerId::new("acme");
        store
            .insert_batch(vec![
                record("tax-row", &customer, Category::Tax, vec![1.0, 0.0]),
                record("hr-row", &customer, Category::Hr, vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let unfiltered = store.search(&customer, &[1.0, 0.0], 10, None).await.unwrap();
        assert_eq!(unfiltered.len(), 2);

        let filtered = store.search(&customer, &[1.0, 0.0], 10, Some(Category::Hr)).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].0, "hr-row");
    }

    #[tokio::test]
    async fn dimension_mismatch_within_a_customer_table_is_rejected_across_categories() {
        let store = FlatVectorStore::new();
        let customer = CustomerId::new("acme");
        store.insert_batch(vec![record("a", &customer, Category::Tax, vec![1.0, 0.0])]).await.unwrap();
        let result = store.insert_batch(vec![record("b", &customer, Category::Hr, vec![1.0, 0.0, 0.0])]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn delete_by_document_id_removes_only_matching_rows() {
        let store = FlatVectorStore::new();
        let customer = CustomerId::new("acme");
        store
            .insert_batch(vec![record("a", &customer, Category::Tax, vec![1.0, 0.0])])
            .await
            .unwrap();
        let removed = store.delete_by_document_id(&customer, "doc-1").await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.search(&customer, &[1.0, 0.0], 10, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_by_category_leaves_other_categories_intact() {
        let store = FlatVectorStore::new();
        let customer = CustomerId::new("acme");
        store
            .insert_batch(vec![
                record("tax-row", &customer, Category::Tax, vec![1.0, 0.0]),
                record("hr-row", &customer, Category::Hr, vec![1.0, 0.0]),
            ])
            .await
            .unwrap();
        let removed = store.delete_by_category(&customer, Category::Tax).await.unwrap();
        assert_eq!(removed, 1);
        let remaining = store.search(&customer, &[1.0, 0.0], 10, None).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].0, "hr-row");
    }
}
