use crate::entities::{Entity, Relationship};
use crate::error::IngestionError;
use async_trait::async_trait;

/// Extracts named entities from a chunk's text and derives relationships
/// between entities that co-occur within the same sentence, per the fixed
/// `derive_relationship` lookup table.
#[async_trait]
pub trait EntityExtractorService: Send + Sync {
    async fn extract(&self, document_id: &str, text: &str) -> Result<(Vec<Entity>, Vec<Relationship>), IngestionError>;
}
