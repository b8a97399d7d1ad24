use crate::error::IngestionError;
use crate::value_objects::{Category, EmbeddingVector};
use async_trait::async_trait;
use serde_json::Value as Json;

/// Raw byte access to the customer's object storage, independent of the
/// local filesystem layout the Path Resolver manages for scratch/output.
#[async_trait]
pub trait ObjectStorePort: Send + Sync {
    async fn get_object(&self, key: &str) -> Result<Vec<u8>, IngestionError>;

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, IngestionError>;
}

/// Turns chunk text into embedding vectors, batched for throughput.
#[async_trait]
pub trait EmbedderPort: Send + Sync {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, IngestionError>;

    fn dimension(&self) -> usize;
}

/// The LLM fallback tier of classification, consulted only when the rule
/// engine's score/margin gate fails to clear its threshold.
#[async_trait]
pub trait ClassifierLlmPort: Send + Sync {
    async fn classify(&self, filename: &str, content_sample: &str) -> Result<(Category, f32), IngestionError>;
}

/// The LLM backing `StructuredExtractorService` for free-text-to-schema
/// mapping.
#[async_trait]
pub trait StructuredExtractorLlmPort: Send + Sync {
    async fn map_to_schema(&self, schema_hint: &str, text: &str) -> Result<Json, IngestionError>;
}

/// The LLM backing `AdaptiveHandlerGenerator`'s code synthesis.
#[async_trait]
pub trait AdaptiveHandlerLlmPort: Send + Sync {
    async fn synthesize(&self, prompt: &str) -> Result<String, IngestionError>;
}

/// Pulls descriptive metadata (title, author, dates) out of a document's
/// extracted text, used to enrich `DocumentRow::metadata`.
#[async_trait]
pub trait MetadataExtractorLlmPort: Send + Sync {
    async fn extract_metadata(&self, text: &str) -> Result<Json, IngestionError>;
}
