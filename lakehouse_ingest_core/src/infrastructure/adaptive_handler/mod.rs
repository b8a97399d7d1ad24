// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Generates a new `Handler` implementation at runtime for an extension
//! the built-ins don't cover, by sampling the file and asking an LLM port
//! to write an extraction routine against it. The generated source is
//! validated structurally before it's ever run, and runs through a
//! sandboxed interpreter port rather than arbitrary code execution - see
//! `GeneratedHandlerRuntime` in the domain crate.

mod runtime;

pub use runtime::FallbackGeneratedHandlerRuntime;

use async_trait::async_trait;
use lakehouse_ingest_domain::entities::FileDescriptor;
use lakehouse_ingest_domain::error::IngestionError;
use lakehouse_ingest_domain::services::external_ports::AdaptiveHandlerLlmPort;
use lakehouse_ingest_domain::services::{AdaptiveHandlerGenerator, GeneratedHandler, GeneratedHandlerRuntime};
use std::sync::Arc;
use tracing::{info, warn};

const SAMPLE_BYTES: usize = 4096;

/// A generated handler's smoke-test extraction must clear this many
/// characters before it's trusted enough to persist - rejects handlers
/// that "succeed" by returning empty or near-empty text.
const MIN_SMOKE_TEST_TEXT_LENGTH: usize = 16;

/// A coarse read of a sample file used to prompt the LLM: byte encoding
/// guess and a handful of structural hints (looks line-delimited? has a
/// recognizable header block?).
#[derive(Debug, Clone)]
pub struct AnalysisRecord {
    pub extension: String,
    pub looks_utf8: bool,
    pub looks_line_delimited: bool,
    pub sample_preview: String,
}

fn analyze(extension: &str, sample: &[u8]) -> AnalysisRecord {
    let looks_utf8 = std::str::from_utf8(sample).is_ok();
    let preview = String::from_utf8_lossy(sample).into_owned();
    let looks_line_delimited = preview.lines().count() > 1;
    AnalysisRecord {
        extension: extension.to_string(),
        looks_utf8,
        looks_line_delimited,
        sample_preview: preview.chars().take(500).collect(),
    }
}

/// Checks that generated source at least parses as a plausible handler:
/// declares a type and something shaped like an extraction function.
/// This is a structural smoke check, not a real compiler pass - the real
/// validation is the sandboxed smoke-test run against the sample file.
fn validate_source_shape(source: &str) -> Result<(), IngestionError> {
    let has_type = source.contains("struct ") || source.contains("class ") || source.contains("fn ");
    let has_extract = source.contains("extract");
    if has_type && has_extract {
        Ok(())
    } else {
        Err(IngestionError::extraction(
            "generated handler source failed structural validation (missing a type or an extract-shaped function)",
        ))
    }
}

/// Default generator: builds an `AnalysisRecord`, prompts the LLM port,
/// validates the shape of what comes back.
pub struct LlmAdaptiveHandlerGenerator {
    llm: Arc<dyn AdaptiveHandlerLlmPort>,
}

impl LlmAdaptiveHandlerGenerator {
    pub fn new(llm: Arc<dyn AdaptiveHandlerLlmPort>) -> Self {
        Self { llm }
    }

    fn build_prompt(&self, analysis: &AnalysisRecord) -> String {
        format!(
            "Write a handler that extracts plain text from a .{} file.\nEncoding: {}\nLine-delimited: {}\nSample:\n{}",
            analysis.extension,
            if analysis.looks_utf8 { "utf-8" } else { "binary" },
            analysis.looks_line_delimited,
            analysis.sample_preview,
        )
    }
}

#[async_trait]
impl AdaptiveHandlerGenerator for LlmAdaptiveHandlerGenerator {
    async fn generate(&self, sample: &FileDescriptor, sample_bytes: &[u8]) -> Result<GeneratedHandler, IngestionError> {
        let extension = sample.extension().unwrap_or("").trim_start_matches('.');
        let truncated = &sample_bytes[..sample_bytes.len().min(SAMPLE_BYTES)];
        let analysis = analyze(extension, truncated);

        info!(extension, "generating adaptive handler");
        let source = self.llm.synthesize(&self.build_prompt(&analysis)).await?;
        validate_source_shape(&source)?;

        Ok(GeneratedHandler {
            extension: extension.to_string(),
            source,
        })
    }
}

/// Smoke-tests a freshly generated handler against the sample file before
/// it's persisted, then persists it to `<handler_store>/<ext>_handler.src`
/// on success so `load_persisted_handlers` picks it up on the next run.
pub async fn generate_validate_and_persist(
    generator: &dyn AdaptiveHandlerGenerator,
    runtime: &dyn GeneratedHandlerRuntime,
    handler_store: &std::path::Path,
    sample: &FileDescriptor,
) -> Result<GeneratedHandler, IngestionError> {
    let sample_bytes = tokio::fs::read(&sample.path).await?;
    let handler = generator.generate(sample, &sample_bytes).await?;

    // Smoke test: does the generated handler run at all against the
    // sample it was generated from, and does it produce usable text?
    let smoke_test = match runtime.run(&handler, sample).await {
        Ok(result) => result,
        Err(err) => {
            warn!(error = %err, extension = %handler.extension, "generated handler failed its smoke test");
            return Err(err);
        }
    };
    if smoke_test.text.trim().chars().count() < MIN_SMOKE_TEST_TEXT_LENGTH {
        warn!(
            extension = %handler.extension,
            chars = smoke_test.text.trim().chars().count(),
            "generated handler's smoke test produced too little text, rejecting"
        );
        return Err(IngestionError::extraction(format!(
            "generated handler for .{} produced fewer than {MIN_SMOKE_TEST_TEXT_LENGTH} characters on its smoke test",
            handler.extension
        )));
    }

    let path = handler_store.join(format!("{}_handler.src", handler.extension));
    tokio::fs::write(&path, &handler.source).await?;
    info!(path = %path.display(), "persisted generated handler");
    Ok(handler)
}

/// Scans `handler_store` for previously generated, persisted handlers and
/// returns their raw source keyed by extension. Last-writer-wins is
/// enforced by the registry's own `register`, not here.
pub async fn load_persisted_handlers(handler_store: &std::path::Path) -> Result<Vec<GeneratedHandler>, IngestionError> {
    let mut handlers = Vec::new();
    let mut entries = match tokio::fs::read_dir(handler_store).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(handlers),
        Err(err) => return Err(IngestionError::from(err)),
    };

    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();
        if let Some(extension) = name.strip_suffix("_handler.src") {
            let source = tokio::fs::read_to_string(entry.path()).await?;
            handlers.push(GeneratedHandler {
                extension: extension.to_string(),
                source,
            });
        }
    }
    Ok(handlers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_source_missing_an_extract_shaped_function() {
        assert!(validate_source_shape("struct Foo;").is_err());
    }

    #[test]
    fn accepts_source_with_a_type_and_extract_fn() {
        assert!(validate_source_shape("struct Foo; fn extract(bytes: &[u8]) -> String { String::new() }").is_ok());
    }

    #[test]
    fn analysis_flags_line_delimited_samples() {
        let record = analyze("log", b"line one\nline two\nline three");
        assert!(record.looks_line_delimited);
        assert!(record.looks_utf8);
    }
}
