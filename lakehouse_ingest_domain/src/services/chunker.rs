use crate::entities::Chunk;
use crate::error::IngestionError;

/// Splits a document's normalized text into chunks, sized according to a
/// strategy keyed on the source file's extension.
pub trait ChunkerService: Send + Sync {
    fn chunk(&self, document_id: &str, extension: Option<&str>, text: &str) -> Result<Vec<Chunk>, IngestionError>;
}
