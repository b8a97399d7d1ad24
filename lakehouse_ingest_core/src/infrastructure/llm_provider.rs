// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # HTTP LLM Provider
//!
//! A single OpenAI-compatible HTTP client backing every LLM-shaped port
//! the domain crate declares: embeddings, classification fallback,
//! structured-schema mapping, adaptive handler synthesis, and metadata
//! extraction. One [`reqwest::Client`] and one [`LlmProviderConfig`] are
//! shared across all five trait impls rather than standing up five
//! separate clients.
//!
//! Every port is equally an external dependency, so every port is
//! implemented the same way here: build a request, send it, map
//! transport/decode failures to the matching [`IngestionError`] variant.
//! There is deliberately no retry/backoff layer in this adapter itself -
//! that belongs to the orchestrator's own per-document failure handling,
//! which already counts and logs failures without aborting the run.

use async_trait::async_trait;
use lakehouse_ingest_domain::error::IngestionError;
use lakehouse_ingest_domain::services::external_ports::{
    AdaptiveHandlerLlmPort, ClassifierLlmPort, MetadataExtractorLlmPort, StructuredExtractorLlmPort,
};
use lakehouse_ingest_domain::services::external_ports::EmbedderPort;
use lakehouse_ingest_domain::value_objects::{Category, EmbeddingVector};
use serde_json::Value as Json;
use std::str::FromStr;
use std::time::Duration;

/// Connection details for the configured embedding/completions provider.
/// `base_url` is expected to expose OpenAI-shaped `/embeddings` and
/// `/chat/completions` routes - true of OpenAI itself and of the common
/// self-hosted/compatible gateways (vLLM, LiteLLM, Ollama's OpenAI shim).
#[derive(Debug, Clone)]
pub struct LlmProviderConfig {
    pub base_url: String,
    pub api_key: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub request_timeout: Duration,
}

impl LlmProviderConfig {
    /// Reads connection details from the environment:
    /// `LAKEHOUSE_LLM_BASE_URL`, `LAKEHOUSE_LLM_API_KEY`,
    /// `LAKEHOUSE_LLM_CHAT_MODEL`, `LAKEHOUSE_LLM_EMBEDDING_MODEL`,
    /// `LAKEHOUSE_LLM_EMBEDDING_DIMENSION`. Returns `None` if the base URL
    /// or key isn't set - the caller is expected to fall back to the
    /// rule-only/no-LLM tier in that case.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("LAKEHOUSE_LLM_BASE_URL").ok()?;
        let api_key = std::env::var("LAKEHOUSE_LLM_API_KEY").ok()?;
        let chat_model = std::env::var("LAKEHOUSE_LLM_CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let embedding_model =
            std::env::var("LAKEHOUSE_LLM_EMBEDDING_MODEL").unwrap_or_else(|_| "text-embedding-3-small".to_string());
        let embedding_dimension = std::env::var("LAKEHOUSE_LLM_EMBEDDING_DIMENSION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1536);
        Some(Self {
            base_url,
            api_key,
            chat_model,
            embedding_model,
            embedding_dimension,
            request_timeout: Duration::from_secs(60),
        })
    }
}

/// Shared HTTP client for every LLM-backed port.
pub struct HttpLlmProvider {
    client: reqwest::Client,
    config: LlmProviderConfig,
}

impl HttpLlmProvider {
    pub fn new(config: LlmProviderConfig) -> Result<Self, IngestionError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| IngestionError::InvalidConfiguration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    async fn chat_completion(&self, system_prompt: &str, user_message: &str) -> Result<String, IngestionError> {
        let body = serde_json::json!({
            "model": self.config.chat_model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_message},
            ],
            "temperature": 0.0,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| IngestionError::StoreWrite(format!("LLM request failed: {e}")))?;

        let status = response.status();
        let payload: Json = response
            .json()
            .await
            .map_err(|e| IngestionError::SerializationError(format!("LLM response was not valid JSON: {e}")))?;

        if !status.is_success() {
            return Err(IngestionError::StoreWrite(format!("LLM provider returned {status}: {payload}")));
        }

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| IngestionError::SerializationError("LLM response missing choices[0].message.content".to_string()))
    }
}

#[async_trait]
impl EmbedderPort for HttpLlmProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, IngestionError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = serde_json::json!({
            "model": self.config.embedding_model,
            "input": texts,
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| IngestionError::StoreWrite(format!("embedding request failed: {e}")))?;

        let status = response.status();
        let payload: Json = response
            .json()
            .await
            .map_err(|e| IngestionError::SerializationError(format!("embedding response was not valid JSON: {e}")))?;

        if !status.is_success() {
            return Err(IngestionError::StoreWrite(format!("embedding provider returned {status}: {payload}")));
        }

        let data = payload["data"]
            .as_array()
            .ok_or_else(|| IngestionError::SerializationError("embedding response missing data[]".to_string()))?;

        data.iter()
            .map(|entry| {
                let components: Vec<f32> = entry["embedding"]
                    .as_array()
                    .ok_or_else(|| IngestionError::SerializationError("embedding entry missing embedding[]".to_string()))?
                    .iter()
                    .map(|v| v.as_f64().unwrap_or(0.0) as f32)
                    .collect();
                EmbeddingVector::new(components).map_err(IngestionError::SerializationError)
            })
            .collect()
    }

    fn dimension(&self) -> usize {
        self.config.embedding_dimension
    }
}

#[async_trait]
impl ClassifierLlmPort for HttpLlmProvider {
    async fn classify(&self, filename: &str, content_sample: &str) -> Result<(Category, f32), IngestionError> {
        let system = "Classify the document into exactly one of: tax, legal, products, hr, \
             correspondence, general. Reply with only the category word.";
        let user = format!("Filename: {filename}\n\nContent sample:\n{content_sample}");
        let reply = self.chat_completion(system, &user).await?;
        let category = Category::from_str(reply.trim()).map_err(IngestionError::Classification)?;
        Ok((category, 0.6))
    }
}

#[async_trait]
impl StructuredExtractorLlmPort for HttpLlmProvider {
    async fn map_to_schema(&self, schema_hint: &str, text: &str) -> Result<Json, IngestionError> {
        let system = format!(
            "Extract structured records from the document text and return ONLY JSON matching this shape:\n{schema_hint}"
        );
        let reply = self.chat_completion(&system, text).await?;
        serde_json::from_str(&reply).map_err(|e| IngestionError::StructuredExtraction(format!("LLM reply was not valid JSON: {e}")))
    }
}

#[async_trait]
impl AdaptiveHandlerLlmPort for HttpLlmProvider {
    async fn synthesize(&self, prompt: &str) -> Result<String, IngestionError> {
        let system = "Write a minimal, self-contained text-extraction routine for the described \
             file format. Respond with source code only, no commentary.";
        self.chat_completion(system, prompt).await
    }
}

#[async_trait]
impl MetadataExtractorLlmPort for HttpLlmProvider {
    async fn extract_metadata(&self, text: &str) -> Result<Json, IngestionError> {
        let system = "Extract descriptive metadata (title, author, dates if present) from this \
             document text and return ONLY a JSON object.";
        let reply = self.chat_completion(system, text).await?;
        serde_json::from_str(&reply).map_err(|e| IngestionError::SerializationError(format!("LLM reply was not valid JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_env_requires_base_url_and_key() {
        std::env::remove_var("LAKEHOUSE_LLM_BASE_URL");
        std::env::remove_var("LAKEHOUSE_LLM_API_KEY");
        assert!(LlmProviderConfig::from_env().is_none());
    }

    #[test]
    fn dimension_reflects_configured_value() {
        let provider = HttpLlmProvider::new(LlmProviderConfig {
            base_url: "https://example.invalid".to_string(),
            api_key: "test-key".to_string(),
            chat_model: "test-model".to_string(),
            embedding_model: "test-embed".to_string(),
            embedding_dimension: 384,
            request_timeout: Duration::from_secs(5),
        })
        .unwrap();
        assert_eq!(provider.dimension(), 384);
    }
}
