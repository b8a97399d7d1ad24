use async_trait::async_trait;
use lakehouse_ingest_domain::entities::FileDescriptor;
use lakehouse_ingest_domain::error::IngestionError;
use lakehouse_ingest_domain::repositories::handler_registry::ExtractionResult;
use lakehouse_ingest_domain::services::{GeneratedHandler, GeneratedHandlerRuntime};

/// Runs a generated handler by falling back to a lossy byte-to-text decode
/// of the sample file, ignoring the generated source's own logic.
///
/// No example repo in this codebase's lineage pulls in a sandboxed
/// scripting or WASM execution engine, and embedding one here to run
/// LLM-authored code would be a fabricated dependency this project doesn't
/// otherwise need. Until a sandboxed runtime is wired in behind this same
/// port, a generated handler's value is in what it validates (shape,
/// smoke-test-ability) rather than what it executes - this fallback gives
/// every adaptively-handled file *some* extracted text rather than none.
pub struct FallbackGeneratedHandlerRuntime;

impl FallbackGeneratedHandlerRuntime {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FallbackGeneratedHandlerRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeneratedHandlerRuntime for FallbackGeneratedHandlerRuntime {
    async fn run(&self, _handler: &GeneratedHandler, file: &FileDescriptor) -> Result<ExtractionResult, IngestionError> {
        let bytes = tokio::fs::read(&file.path).await?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        Ok(ExtractionResult { text, chunks: Vec::new() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lakehouse_ingest_domain::value_objects::CustomerId;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn falls_back_to_a_lossy_decode_of_the_sample_file() {
        let file = NamedTempFile::new().unwrap();
        tokio::fs::write(file.path(), b"hello world").await.unwrap();
        let descriptor = FileDescriptor::new(CustomerId::new("acme"), file.path().to_path_buf(), 11);
        let handler = GeneratedHandler {
            extension: "xyz".to_string(),
            source: "struct Foo; fn extract() {}".to_string(),
        };

        let runtime = FallbackGeneratedHandlerRuntime::new();
        let result = runtime.run(&handler, &descriptor).await.unwrap();
        assert_eq!(result.text, "hello world");
    }
}
