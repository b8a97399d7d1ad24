use crate::entities::FileDescriptor;
use crate::error::IngestionError;
use crate::repositories::handler_registry::ExtractionResult;
use async_trait::async_trait;

/// A handler generated at runtime for a file extension the built-in
/// handlers don't cover. The generator produces source; a
/// `GeneratedHandlerRuntime` is what actually runs it.
#[derive(Debug, Clone)]
pub struct GeneratedHandler {
    pub extension: String,
    pub source: String,
}

/// Synthesizes a new handler for an unrecognized extension, typically by
/// asking an LLM port to write an extraction routine against a sample of
/// the file's content.
#[async_trait]
pub trait AdaptiveHandlerGenerator: Send + Sync {
    async fn generate(&self, sample: &FileDescriptor, sample_bytes: &[u8]) -> Result<GeneratedHandler, IngestionError>;
}

/// Executes a `GeneratedHandler` against a file. Kept as its own port
/// rather than folded into the generator so a sandboxed or
/// process-isolated runtime can be swapped in without touching generation.
#[async_trait]
pub trait GeneratedHandlerRuntime: Send + Sync {
    async fn run(&self, handler: &GeneratedHandler, file: &FileDescriptor) -> Result<ExtractionResult, IngestionError>;
}
