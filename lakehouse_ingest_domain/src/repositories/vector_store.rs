use crate::entities::EmbeddingRecord;
use crate::error::IngestionError;
use crate::value_objects::{Category, CustomerId};
use async_trait::async_trait;

/// Index-sizing parameters derived from a table's row count and embedding
/// dimension, per the lakehouse's IVF-PQ index construction rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorIndexParams {
    pub num_partitions: usize,
    pub num_sub_vectors: usize,
}

/// Vector storage and similarity search: a single logical `embeddings`
/// table per customer, spanning every category, with `category` carried
/// as a scalar column on each row rather than a partition key. Every row
/// in a customer's table must share the embedder's dimension - see
/// `EmbeddingVector`'s own single-vector invariant for what's checked
/// before a record ever reaches this port. Once a customer's first record
/// is inserted, that table's dimension is frozen.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn insert_batch(&self, records: Vec<EmbeddingRecord>) -> Result<usize, IngestionError>;

    async fn create_index(&self, customer_id: &CustomerId, row_count: usize, dimension: usize) -> Result<VectorIndexParams, IngestionError>;

    /// Top-`top_k` nearest by cosine similarity, optionally filtered to a
    /// single category via an equality predicate over the scalar column.
    async fn search(
        &self,
        customer_id: &CustomerId,
        query: &[f32],
        top_k: usize,
        category: Option<Category>,
    ) -> Result<Vec<(String, f32)>, IngestionError>;

    async fn delete_by_document_id(&self, customer_id: &CustomerId, document_id: &str) -> Result<usize, IngestionError>;

    async fn delete_by_category(&self, customer_id: &CustomerId, category: Category) -> Result<usize, IngestionError>;

    /// Reclaims space left behind by deletes. A no-op on backends without
    /// a concept of dead space.
    async fn compact(&self, customer_id: &CustomerId) -> Result<(), IngestionError>;
}

/// `num_partitions = max(sqrt(row_count), 8)`; `num_sub_vectors` is the
/// first divisor of `dimension` found in `[128, 64, 32, 16, 8]`, falling
/// back to `8` if none divide evenly.
pub fn index_params_for(row_count: usize, dimension: usize) -> VectorIndexParams {
    let num_partitions = ((row_count as f64).sqrt() as usize).max(8);
    let num_sub_vectors = [128usize, 64, 32, 16, 8]
        .into_iter()
        .find(|candidate| dimension % candidate == 0)
        .unwrap_or(8);
    VectorIndexParams {
        num_partitions,
        num_sub_vectors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_tables_floor_partitions_at_eight() {
        let params = index_params_for(4, 128);
        assert_eq!(params.num_partitions, 8);
    }

    #[test]
    fn partitions_scale_with_sqrt_of_row_count() {
        let params = index_params_for(10_000, 128);
        assert_eq!(params.num_partitions, 100);
    }

    #[test]
    fn sub_vector_count_picks_largest_clean_divisor() {
        assert_eq!(index_params_for(100, 256).num_sub_vectors, 128);
        assert_eq!(index_params_for(100, 64).num_sub_vectors, 64);
    }

    #[test]
    fn sub_vector_count_falls_back_to_eight_when_no_divisor_fits() {
        assert_eq!(index_params_for(100, 17).num_sub_vectors, 8);
    }
}
