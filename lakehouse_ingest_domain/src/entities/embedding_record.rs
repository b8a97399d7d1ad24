use crate::value_objects::{Category, CustomerId, EmbeddingVector};
use serde::{Deserialize, Serialize};

/// A single chunk's embedding, ready for the vector store. `ordinal` is the
/// chunk's position within its document and is what lets the orchestrator
/// scatter embedder batch results back into per-document order even though
/// the embedder call itself doesn't preserve it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub chunk_id: String,
    pub document_id: String,
    pub customer_id: CustomerId,
    pub category: Category,
    pub ordinal: usize,
    pub text: String,
    pub vector: EmbeddingVector,
}
