use crate::entities::{Chunk, FileDescriptor};
use crate::error::IngestionError;
use async_trait::async_trait;

/// Output of extracting a single file: normalized text plus whatever
/// structured rows the handler could pull directly (e.g. a CSV handler's
/// rows, as opposed to text the Structured Extractor must still parse).
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    pub text: String,
    pub chunks: Vec<Chunk>,
}

/// A format-specific extractor, looked up by file extension in the
/// Handler Registry. Built-in handlers and adaptively generated handlers
/// implement the same trait so the orchestrator never needs to know which
/// kind it's holding.
#[async_trait]
pub trait Handler: Send + Sync {
    /// The lowercased, dot-prefixed extensions this handler claims (e.g.
    /// `[".pdf"]`). A handler that needs to key off more than the final
    /// extension (a compound filename like `catalog.xml`) claims the full
    /// lowercase filename suffix instead, without the leading dot -
    /// `HandlerRegistry::lookup_for_file` checks those before falling back
    /// to a plain extension match.
    fn extensions(&self) -> &[&'static str];

    async fn extract(&self, file: &FileDescriptor) -> Result<ExtractionResult, IngestionError>;
}
