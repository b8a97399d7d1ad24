use async_trait::async_trait;
use lakehouse_ingest_domain::error::IngestionError;
use lakehouse_ingest_domain::services::external_ports::ClassifierLlmPort;
use lakehouse_ingest_domain::services::{ClassificationResult, ClassifierService};
use lakehouse_ingest_domain::value_objects::Category;
use std::sync::Arc;
use tracing::debug;

use super::RuleClassifier;

/// Prefers the LLM tier when a text sample is available, falling through
/// to the rule engine on LLM absence, transport failure, or a parsed
/// category outside the closed set (`ClassifierLlmPort::classify` already
/// rejects those as an `Err`).
pub struct TwoTierClassifier {
    rules: RuleClassifier,
    llm: Arc<dyn ClassifierLlmPort>,
}

impl TwoTierClassifier {
    pub fn new(llm: Arc<dyn ClassifierLlmPort>) -> Self {
        Self {
            rules: RuleClassifier::new(),
            llm,
        }
    }

    fn rule_fallback(&self, path: &str, filename: &str) -> ClassificationResult {
        self.rules.classify_sync(path, filename).unwrap_or(ClassificationResult {
            category: Category::General,
            confidence: 0.0,
        })
    }
}

#[async_trait]
impl ClassifierService for TwoTierClassifier {
    async fn classify(&self, path: &str, filename: &str, text_sample: &str) -> Result<ClassificationResult, IngestionError> {
        if !text_sample.is_empty() {
            match self.llm.classify(filename, text_sample).await {
                Ok((category, confidence)) => {
                    debug!(filename, %category, "LLM tier classified");
                    return Ok(ClassificationResult { category, confidence });
                }
                Err(err) => {
                    debug!(filename, error = %err, "LLM tier unavailable or out-of-set, falling through to rules");
                }
            }
        }

        Ok(self.rule_fallback(path, filename))
    }

    /// Rule-classifies every item first, then sends only the low-confidence
    /// results (`confidence < 0.5`) through the LLM tier - cheaper than an
    /// LLM call per document when most filenames are unambiguous.
    async fn classify_batch(&self, items: &[(&str, &str, &str)]) -> Result<Vec<ClassificationResult>, IngestionError> {
        let mut results: Vec<ClassificationResult> = items
            .iter()
            .map(|(path, filename, _)| self.rule_fallback(path, filename))
            .collect();

        for (index, (_, filename, text_sample)) in items.iter().enumerate() {
            if results[index].confidence >= 0.5 || text_sample.is_empty() {
                continue;
            }
            match self.llm.classify(filename, text_sample).await {
                Ok((category, confidence)) => {
                    debug!(filename, %category, "LLM tier reclassified low-confidence rule result");
                    results[index] = ClassificationResult { category, confidence };
                }
                Err(err) => {
                    debug!(filename, error = %err, "LLM tier unavailable for low-confidence item, keeping rule result");
                }
            }
        }

        Ok(results)
    }
}
