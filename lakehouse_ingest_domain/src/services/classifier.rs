use crate::error::IngestionError;
use crate::value_objects::Category;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationResult {
    pub category: Category,
    pub confidence: f32,
}

/// Assigns a `Category` to a file. The two-tier implementation prefers the
/// LLM tier when `text_sample` is non-empty, falling through to the rule
/// engine on LLM absence, failure, or an out-of-set result.
#[async_trait]
pub trait ClassifierService: Send + Sync {
    async fn classify(&self, path: &str, filename: &str, text_sample: &str) -> Result<ClassificationResult, IngestionError>;

    /// Batch variant: rule-classifies every `(path, filename, text_sample)`
    /// item first, then sends only low-confidence (`confidence < 0.5`)
    /// results through the LLM tier. The default falls back to calling
    /// `classify` once per item; implementations with a rule tier should
    /// override this with the cheaper tiered strategy.
    async fn classify_batch(&self, items: &[(&str, &str, &str)]) -> Result<Vec<ClassificationResult>, IngestionError> {
        let mut results = Vec::with_capacity(items.len());
        for (path, filename, text_sample) in items {
            results.push(self.classify(path, filename, text_sample).await?);
        }
        Ok(results)
    }
}
