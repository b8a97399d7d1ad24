// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Orchestrator
//!
//! Drives one customer's ingestion run end to end: deployment context load,
//! crawl, bounded-concurrency extract, single-threaded classify, optional
//! structured extract, chunk + optional metadata enrichment, optional
//! entity extract, embed, load, finalize.
//!
//! Concurrency follows the same split the rest of this crate draws between
//! I/O-bound and CPU-bound work: the extract stage fans out with
//! [`futures::future::join_all`] gated by a [`tokio::sync::Semaphore`]
//! sized by `max_workers`, run cooperatively on the current task rather
//! than across `tokio::spawn`'d tasks - every suspension point here is I/O
//! (disk read, LLM call), so there's no need for OS-thread parallelism,
//! only bounded concurrency. Outcomes are captured per file instead of
//! short-circuiting the batch on the first error - a single bad file
//! must never abort a run.

mod crawl;

pub use crawl::CrawlResult;

use crate::infrastructure::adaptive_handler;
use crate::infrastructure::handlers::HandlerRegistry;
use crate::infrastructure::metrics::concurrency_metrics::ConcurrencyMetrics;
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use lakehouse_ingest_domain::aggregates::{IngestionRun, IngestionStage};
use lakehouse_ingest_domain::entities::tabular_record::{ChunkRow, DocumentRow};
use lakehouse_ingest_domain::entities::{Chunk, DeploymentContext, EmbeddingRecord, FileDescriptor, TabularRecord};
use lakehouse_ingest_domain::error::IngestionError;
use lakehouse_ingest_domain::events::NoOpObserver;
use lakehouse_ingest_domain::repositories::handler_registry::ExtractionResult;
use lakehouse_ingest_domain::repositories::{GraphStore, Handler, PathResolver, TabularStore, VectorStore};
use lakehouse_ingest_domain::services::external_ports::{EmbedderPort, MetadataExtractorLlmPort};
use lakehouse_ingest_domain::services::{
    AdaptiveHandlerGenerator, ChunkerService, ClassifierService, EntityExtractorService, GeneratedHandler,
    GeneratedHandlerRuntime, StructuredExtractorService,
};
use lakehouse_ingest_domain::value_objects::{Category, CustomerId, DeploymentMode, PathKind};
use lakehouse_ingest_domain::IngestionObserver;
use serde_json::Value as Json;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, Semaphore};
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

/// Classification LLM prompts get at most this much of the extracted text.
const CLASSIFICATION_SAMPLE_BYTES: usize = 3 * 1024;

/// Truncates `text` to at most `CLASSIFICATION_SAMPLE_BYTES` on a char
/// boundary, for the classifier's LLM tier prompt.
fn classification_text_sample(text: &str) -> &str {
    if text.len() <= CLASSIFICATION_SAMPLE_BYTES {
        return text;
    }
    let mut end = CLASSIFICATION_SAMPLE_BYTES;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Tunables for one `run`. Cheap to construct fresh per run; `cancel` is
/// the one field worth sharing - clone the `Arc` out before calling `run`
/// so a signal handler elsewhere can trip it mid-run.
#[derive(Clone)]
pub struct IngestionOptions {
    pub max_workers: usize,
    pub max_crawl_depth: u32,
    pub max_file_bytes: u64,
    pub embed_batch_size: usize,
    pub enable_structured_extraction: bool,
    pub enable_entity_extraction: bool,
    pub enable_metadata_enrichment: bool,
    pub adaptive_handler_timeout: Duration,
    pub classification_timeout: Duration,
    pub cancel: Arc<AtomicBool>,
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            max_workers: 8,
            max_crawl_depth: 20,
            max_file_bytes: 100 * 1024 * 1024,
            embed_batch_size: 32,
            enable_structured_extraction: true,
            enable_entity_extraction: true,
            enable_metadata_enrichment: true,
            adaptive_handler_timeout: Duration::from_secs(60),
            classification_timeout: Duration::from_secs(30),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Wraps a freshly generated, freshly persisted handler so it can be
/// registered into the same `HandlerRegistry` built-ins live in. The
/// extension is only known at generation time, not compile time, so it's
/// leaked once per extension to satisfy `Handler::extensions`'s `'static`
/// bound - acceptable for a handler that, once generated, lives for the
/// rest of the process.
struct GeneratedHandlerAdapter {
    extension: &'static str,
    handler: GeneratedHandler,
    runtime: Arc<dyn GeneratedHandlerRuntime>,
}

impl GeneratedHandlerAdapter {
    fn new(handler: GeneratedHandler, runtime: Arc<dyn GeneratedHandlerRuntime>) -> Self {
        let extension: &'static str =
            Box::leak(format!(".{}", handler.extension.trim_start_matches('.')).into_boxed_str());
        Self { extension, handler, runtime }
    }
}

#[async_trait]
impl Handler for GeneratedHandlerAdapter {
    fn extensions(&self) -> &[&'static str] {
        std::slice::from_ref(&self.extension)
    }

    async fn extract(&self, file: &FileDescriptor) -> Result<ExtractionResult, IngestionError> {
        self.runtime.run(&self.handler, file).await
    }
}

/// A crawled file after extraction, before classification.
struct ExtractedFile {
    file: FileDescriptor,
    text: String,
    pre_chunks: Vec<Chunk>,
}

enum ExtractOutcome {
    Extracted(ExtractedFile),
    Unsupported(FileDescriptor),
    Failed(FileDescriptor, String),
}

/// A file that has made it through extract, classify, chunk, and the
/// optional enrichment sub-stages - ready for embedding and loading.
struct Document {
    id: String,
    filename: String,
    category: Category,
    text: String,
    chunks: Vec<Chunk>,
    metadata: Json,
}

/// The ten-step pipeline. One instance is shared across runs; all mutable
/// state lives on the `IngestionRun` returned by `run`, not on `self`.
pub struct Orchestrator {
    deployment_mode: DeploymentMode,
    path_resolver: Arc<dyn PathResolver>,
    handler_registry: Arc<HandlerRegistry>,
    adaptive_generator: Option<Arc<dyn AdaptiveHandlerGenerator>>,
    handler_runtime: Arc<dyn GeneratedHandlerRuntime>,
    classifier: Arc<dyn ClassifierService>,
    chunker: Arc<dyn ChunkerService>,
    structured_extractor: Option<Arc<dyn StructuredExtractorService>>,
    entity_extractor: Option<Arc<dyn EntityExtractorService>>,
    metadata_llm: Option<Arc<dyn MetadataExtractorLlmPort>>,
    embedder: Arc<dyn EmbedderPort>,
    tabular_store: Arc<dyn TabularStore>,
    vector_store: Arc<dyn VectorStore>,
    graph_store: Option<Arc<dyn GraphStore>>,
    observer: Arc<dyn IngestionObserver>,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        deployment_mode: DeploymentMode,
        path_resolver: Arc<dyn PathResolver>,
        handler_registry: Arc<HandlerRegistry>,
        handler_runtime: Arc<dyn GeneratedHandlerRuntime>,
        classifier: Arc<dyn ClassifierService>,
        chunker: Arc<dyn ChunkerService>,
        embedder: Arc<dyn EmbedderPort>,
        tabular_store: Arc<dyn TabularStore>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            deployment_mode,
            path_resolver,
            handler_registry,
            adaptive_generator: None,
            handler_runtime,
            classifier,
            chunker,
            structured_extractor: None,
            entity_extractor: None,
            metadata_llm: None,
            embedder,
            tabular_store,
            vector_store,
            graph_store: None,
            observer: Arc::new(NoOpObserver),
        }
    }

    pub fn with_adaptive_generator(mut self, generator: Arc<dyn AdaptiveHandlerGenerator>) -> Self {
        self.adaptive_generator = Some(generator);
        self
    }

    pub fn with_structured_extractor(mut self, extractor: Arc<dyn StructuredExtractorService>) -> Self {
        self.structured_extractor = Some(extractor);
        self
    }

    pub fn with_entity_extractor(mut self, extractor: Arc<dyn EntityExtractorService>) -> Self {
        self.entity_extractor = Some(extractor);
        self
    }

    pub fn with_metadata_llm(mut self, llm: Arc<dyn MetadataExtractorLlmPort>) -> Self {
        self.metadata_llm = Some(llm);
        self
    }

    pub fn with_graph_store(mut self, store: Arc<dyn GraphStore>) -> Self {
        self.graph_store = Some(store);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn IngestionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Step 1. A missing descriptor simply disables §4.7-style enrichment
    /// for this customer; it is not an error.
    async fn load_deployment_context(&self, customer_id: &CustomerId) -> Option<DeploymentContext> {
        let staging = self.path_resolver.resolve(customer_id, PathKind::UploadStaging).await.ok()?;
        let markdown = tokio::fs::read_to_string(staging.join("DEPLOYMENT.md")).await.ok()?;
        Some(DeploymentContext::parse_descriptor(&markdown, self.deployment_mode))
    }

    /// Looks up a built-in or previously generated handler; on a registry
    /// miss, attempts adaptive generation once per extension (serialized
    /// by `generation_lock` so two concurrent misses for the same
    /// extension don't double-generate).
    async fn ensure_handler_for(
        &self,
        file: &FileDescriptor,
        handler_store: &Path,
        generation_lock: &AsyncMutex<()>,
        generation_timeout: Duration,
    ) -> Option<Arc<dyn Handler>> {
        let ext = file.extension()?;
        if let Some(handler) = self.handler_registry.lookup_for_file(&file.filename, Some(ext)) {
            return Some(handler);
        }
        let generator = self.adaptive_generator.as_ref()?;

        let _guard = generation_lock.lock().await;
        if let Some(handler) = self.handler_registry.lookup_for_file(&file.filename, Some(ext)) {
            return Some(handler);
        }

        let generated = match timeout(
            generation_timeout,
            adaptive_handler::generate_validate_and_persist(generator.as_ref(), self.handler_runtime.as_ref(), handler_store, file),
        )
        .await
        {
            Ok(Ok(handler)) => handler,
            Ok(Err(err)) => {
                warn!(error = %err, extension = ext, "adaptive handler generation failed");
                return None;
            }
            Err(_) => {
                warn!(extension = ext, "adaptive handler generation timed out");
                return None;
            }
        };

        let adapter: Arc<dyn Handler> = Arc::new(GeneratedHandlerAdapter::new(generated, self.handler_runtime.clone()));
        self.handler_registry.register(adapter.clone());
        Some(adapter)
    }

    /// Step 3, one file: resolve a handler (adaptive fallback included)
    /// and extract. Never returns an `Err` - every failure mode is folded
    /// into `ExtractOutcome` so a bad file can't abort the batch.
    async fn extract_one(
        &self,
        file: FileDescriptor,
        handler_store: &Path,
        generation_lock: &AsyncMutex<()>,
        generation_timeout: Duration,
    ) -> ExtractOutcome {
        let handler = match self.ensure_handler_for(&file, handler_store, generation_lock, generation_timeout).await {
            Some(handler) => handler,
            None => return ExtractOutcome::Unsupported(file),
        };
        match handler.extract(&file).await {
            Ok(result) => ExtractOutcome::Extracted(ExtractedFile { file, text: result.text, pre_chunks: result.chunks }),
            Err(err) => ExtractOutcome::Failed(file, err.to_string()),
        }
    }

    /// Runs the full pipeline over `folders` for `customer_id`, returning
    /// the run's final state. Per-file errors never escape this function;
    /// only user-input (missing folder) and fatal-invariant classes do,
    /// and even those are folded into the returned `IngestionRun` rather
    /// than propagated, matching `run(...) -> IngestionProgress`.
    pub async fn run(&self, folders: &[PathBuf], customer_id: CustomerId, options: IngestionOptions) -> IngestionRun {
        let run_id = uuid::Uuid::new_v4().to_string();
        let mut run = IngestionRun::start(run_id.clone(), customer_id.clone(), Utc::now());

        if let Err(err) = self.run_inner(folders, &customer_id, &options, &mut run).await {
            warn!(run_id = %run_id, error = %err, "ingestion run failed");
            run.fail(Utc::now(), err.to_string());
        }

        self.observer.on_run_completed(&run_id, run.stage() == IngestionStage::Complete).await;
        run
    }

    async fn run_inner(
        &self,
        folders: &[PathBuf],
        customer_id: &CustomerId,
        options: &IngestionOptions,
        run: &mut IngestionRun,
    ) -> Result<(), IngestionError> {
        // Step 1: deployment context.
        let deployment_context = self.load_deployment_context(customer_id).await;
        if let Some(ctx) = &deployment_context {
            debug!(company = %ctx.company_name, "loaded deployment context");
        }

        // Step 2: crawl.
        run.advance_to(IngestionStage::Crawling)?;
        let crawled = crawl::crawl_folders(folders, customer_id, &self.handler_registry, options.max_crawl_depth, options.max_file_bytes).await?;
        run.files_discovered = crawled.files.len();
        if !crawled.unknown_extensions.is_empty() {
            info!(extensions = ?crawled.unknown_extensions, "crawl found extensions with no registered handler");
        }
        self.observer.on_crawl_completed(crawled.files.len()).await;
        if options.cancel.load(Ordering::SeqCst) {
            return Err(IngestionError::Cancelled("cancelled during crawl".to_string()));
        }

        // Step 3: extract, bounded by a semaphore sized by max_workers.
        let handler_store = self.path_resolver.resolve(customer_id, PathKind::HandlerStore).await?;
        let worker_count = options.max_workers.max(1);
        let semaphore = Semaphore::new(worker_count);
        let generation_lock = AsyncMutex::new(());
        let metrics = ConcurrencyMetrics::new(worker_count);
        let extract_futures = crawled.files.into_iter().map(|file| {
            let semaphore = &semaphore;
            let handler_store = &handler_store;
            let generation_lock = &generation_lock;
            let metrics = &metrics;
            async move {
                if options.cancel.load(Ordering::SeqCst) {
                    return ExtractOutcome::Failed(file, "cancelled".to_string());
                }
                let wait_started = std::time::Instant::now();
                let _permit = semaphore.acquire().await.expect("semaphore is never closed");
                metrics.record_extract_wait(wait_started.elapsed());
                metrics.update_extract_slots_available(semaphore.available_permits());
                metrics.task_started();
                let outcome = self.extract_one(file, handler_store, generation_lock, options.adaptive_handler_timeout).await;
                metrics.task_completed();
                metrics.update_extract_slots_available(semaphore.available_permits());
                outcome
            }
        });
        let extract_results = join_all(extract_futures).await;
        debug!(
            tasks_completed = metrics.tasks_completed(),
            saturation_percent = metrics.extract_saturation_percent(),
            wait_p50_ms = metrics.extract_wait_p50(),
            wait_p99_ms = metrics.extract_wait_p99(),
            "extract stage concurrency metrics"
        );

        let mut extracted_files = Vec::new();
        for outcome in extract_results {
            match outcome {
                ExtractOutcome::Extracted(extracted) => extracted_files.push(extracted),
                ExtractOutcome::Unsupported(file) => {
                    run.record_failure(Utc::now(), format!("unsupported file: {}", file.filename));
                    self.observer.on_file_completed(&file.id, false).await;
                }
                ExtractOutcome::Failed(file, error) => {
                    run.record_failure(Utc::now(), format!("{}: {error}", file.filename));
                    self.observer.on_file_completed(&file.id, false).await;
                }
            }
        }
        if options.cancel.load(Ordering::SeqCst) {
            return Err(IngestionError::Cancelled("cancelled after extract".to_string()));
        }

        // Step 4: classify, single-threaded to keep progress ordering predictable.
        run.advance_to(IngestionStage::Classifying)?;
        let mut classified = Vec::with_capacity(extracted_files.len());
        for extracted in extracted_files {
            if options.cancel.load(Ordering::SeqCst) {
                break;
            }
            let (category, confidence) = match extracted.file.pre_assigned_category {
                Some(category) => (category, 1.0),
                None => {
                    let path_str = extracted.file.path.to_string_lossy().into_owned();
                    let text_sample = classification_text_sample(&extracted.text);
                    match timeout(
                        options.classification_timeout,
                        self.classifier.classify(&path_str, &extracted.file.filename, text_sample),
                    )
                    .await
                    {
                        Ok(Ok(result)) => (result.category, result.confidence),
                        Ok(Err(err)) => {
                            warn!(error = %err, file = %extracted.file.filename, "classification failed, defaulting to general");
                            (Category::General, 0.0)
                        }
                        Err(_) => {
                            warn!(file = %extracted.file.filename, "classification timed out, defaulting to general");
                            (Category::General, 0.0)
                        }
                    }
                }
            };
            self.observer.on_file_classified(&extracted.file.id, category, confidence).await;
            classified.push((extracted, category));
        }

        // Steps 5-7: structured extract, chunk + enrich, entity extract.
        run.advance_to(IngestionStage::Processing)?;
        let mut documents = Vec::with_capacity(classified.len());
        let mut structured_records: Vec<TabularRecord> = Vec::new();

        for (extracted, category) in classified {
            if options.cancel.load(Ordering::SeqCst) {
                break;
            }
            let document_id = extracted.file.id.clone();

            if options.enable_structured_extraction {
                if let Some(extractor) = &self.structured_extractor {
                    match extractor.extract(category, &document_id, &extracted.text).await {
                        Ok(records) => structured_records.extend(records),
                        Err(err) => warn!(error = %err, document_id, "structured extraction failed, skipping"),
                    }
                }
            }

            let chunks = if !extracted.pre_chunks.is_empty() {
                extracted.pre_chunks
            } else {
                let chunker = self.chunker.clone();
                let chunk_document_id = document_id.clone();
                let chunk_extension = extracted.file.extension().map(str::to_string);
                let chunk_text = extracted.text.clone();
                let chunk_result = tokio::task::spawn_blocking(move || {
                    crate::infrastructure::config::rayon_config::RAYON_POOLS
                        .pool()
                        .install(|| chunker.chunk(&chunk_document_id, chunk_extension.as_deref(), &chunk_text))
                })
                .await
                .unwrap_or_else(|e| Err(IngestionError::internal_error(format!("chunking task panicked: {e}"))));

                match chunk_result {
                    Ok(chunks) => chunks,
                    Err(err) => {
                        run.record_failure(Utc::now(), format!("{}: {err}", extracted.file.filename));
                        self.observer.on_file_completed(&document_id, false).await;
                        continue;
                    }
                }
            };

            let mut metadata = Json::Object(serde_json::Map::new());
            if options.enable_metadata_enrichment {
                if let Some(llm) = &self.metadata_llm {
                    match llm.extract_metadata(&extracted.text).await {
                        Ok(extracted_metadata) => metadata = extracted_metadata,
                        Err(err) => warn!(error = %err, document_id, "metadata enrichment failed, continuing without it"),
                    }
                }
            }

            if options.enable_entity_extraction {
                if let Some(extractor) = &self.entity_extractor {
                    match extractor.extract(&document_id, &extracted.text).await {
                        Ok((entities, relationships)) => {
                            if let Some(graph) = &self.graph_store {
                                if !entities.is_empty() {
                                    if let Err(err) = graph.upsert_entities(customer_id, entities).await {
                                        warn!(error = %err, document_id, "graph entity upsert failed");
                                    }
                                }
                                if !relationships.is_empty() {
                                    if let Err(err) = graph.upsert_relationships(customer_id, relationships).await {
                                        warn!(error = %err, document_id, "graph relationship upsert failed");
                                    }
                                }
                            }
                        }
                        Err(err) => warn!(error = %err, document_id, "entity extraction failed, skipping"),
                    }
                }
            }

            run.record_success();
            self.observer.on_file_completed(&document_id, true).await;
            self.observer.on_progress_update(run.files_processed + run.files_failed, run.files_discovered).await;
            documents.push(Document { id: document_id, filename: extracted.file.filename, category, text: extracted.text, chunks, metadata });
        }
        if options.cancel.load(Ordering::SeqCst) {
            return Err(IngestionError::Cancelled("cancelled during processing".to_string()));
        }

        // Step 8: embed. Flatten chunks with stable ids, batch, scatter back in order.
        run.advance_to(IngestionStage::Embedding)?;
        let mut flat_refs: Vec<(usize, usize)> = Vec::new();
        let mut flat_texts: Vec<String> = Vec::new();
        for (doc_idx, document) in documents.iter().enumerate() {
            for (chunk_idx, chunk) in document.chunks.iter().enumerate() {
                flat_refs.push((doc_idx, chunk_idx));
                flat_texts.push(chunk.text.clone());
            }
        }

        let mut vectors = Vec::with_capacity(flat_texts.len());
        for batch in flat_texts.chunks(options.embed_batch_size.max(1)) {
            let batch_vectors = self.embedder.embed_batch(batch).await?;
            vectors.extend(batch_vectors);
        }

        let mut embeddings = Vec::with_capacity(vectors.len());
        for ((doc_idx, chunk_idx), vector) in flat_refs.into_iter().zip(vectors.into_iter()) {
            let document = &documents[doc_idx];
            let chunk = &document.chunks[chunk_idx];
            embeddings.push(EmbeddingRecord {
                chunk_id: chunk.id.clone(),
                document_id: document.id.clone(),
                customer_id: customer_id.clone(),
                category: document.category,
                ordinal: chunk.ordinal,
                text: chunk.text.clone(),
                vector,
            });
        }

        // Step 9: load. Group documents by category for the tabular store;
        // embeddings and structured rows are appended in single calls.
        run.advance_to(IngestionStage::Loading)?;
        let mut categories: Vec<Category> = documents.iter().map(|d| d.category).collect();
        categories.sort_by_key(|c| c.as_str());
        categories.dedup();
        if categories.is_empty() {
            categories.push(Category::General);
        }
        for category in &categories {
            self.tabular_store.ensure_schema(customer_id, *category).await?;
        }

        for category in &categories {
            let mut rows = Vec::new();
            for document in documents.iter().filter(|d| d.category == *category) {
                rows.push(TabularRecord::Document(DocumentRow {
                    document_id: document.id.clone(),
                    customer_id: Some(customer_id.clone()),
                    filename: document.filename.clone(),
                    category: document.category,
                    ingested_at: Utc::now(),
                    metadata: document.metadata.clone(),
                }));
                for chunk in &document.chunks {
                    rows.push(TabularRecord::Chunk(ChunkRow {
                        chunk_id: chunk.id.clone(),
                        document_id: document.id.clone(),
                        customer_id: Some(customer_id.clone()),
                        category: document.category,
                        ordinal: chunk.ordinal,
                        text: chunk.text.clone(),
                    }));
                }
            }
            rows.retain(TabularRecord::has_primary_key);
            if !rows.is_empty() {
                self.tabular_store.write_batch(customer_id, rows).await?;
            }
        }

        if !structured_records.is_empty() {
            let valid: Vec<_> = structured_records.into_iter().filter(TabularRecord::has_primary_key).collect();
            if !valid.is_empty() {
                self.tabular_store.write_batch(customer_id, valid).await?;
            }
        }

        if !embeddings.is_empty() {
            let dimension = embeddings[0].vector.dimension();
            let count = embeddings.len();
            self.vector_store.insert_batch(embeddings).await?;
            self.vector_store.create_index(customer_id, count, dimension).await?;
        }

        // Step 10: finalize.
        run.complete(Utc::now())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lakehouse_ingest_domain::entities::{EmbeddingRecord as _EmbeddingRecordAlias, Entity, Relationship};
    use lakehouse_ingest_domain::repositories::handler_registry::ExtractionResult as _ExtractionResultAlias;
    use lakehouse_ingest_domain::services::{ClassificationResult, GeneratedHandler as _GeneratedHandlerAlias};
    use lakehouse_ingest_domain::value_objects::EmbeddingVector;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::tempdir;

    struct StubPathResolver {
        base: PathBuf,
    }

    #[async_trait]
    impl PathResolver for StubPathResolver {
        async fn resolve(&self, customer_id: &CustomerId, kind: PathKind) -> Result<PathBuf, IngestionError> {
            let path = self.base.join(customer_id.as_str()).join(kind.dir_name());
            tokio::fs::create_dir_all(&path).await?;
            Ok(path)
        }
    }

    struct StubEmbedder {
        dimension: usize,
    }

    #[async_trait]
    impl EmbedderPort for StubEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, IngestionError> {
            Ok(texts
                .iter()
                .map(|_| EmbeddingVector::new(vec![0.1; self.dimension]).unwrap())
                .collect())
        }

        fn dimension(&self) -> usize {
            self.dimension
        }
    }

    struct AlwaysGeneralClassifier;

    #[async_trait]
    impl ClassifierService for AlwaysGeneralClassifier {
        async fn classify(&self, _path: &str, _filename: &str, _text_sample: &str) -> Result<ClassificationResult, IngestionError> {
            Ok(ClassificationResult { category: Category::General, confidence: 0.5 })
        }
    }

    struct LineChunker;

    impl ChunkerService for LineChunker {
        fn chunk(&self, document_id: &str, _extension: Option<&str>, text: &str) -> Result<Vec<Chunk>, IngestionError> {
            Ok(text.lines().enumerate().map(|(i, line)| Chunk::new(document_id, i, line.to_string())).collect())
        }
    }

    struct RecordingGraphStore {
        entities: Mutex<Vec<Entity>>,
    }

    #[async_trait]
    impl GraphStore for RecordingGraphStore {
        async fn upsert_entities(&self, _customer_id: &CustomerId, entities: Vec<Entity>) -> Result<usize, IngestionError> {
            let n = entities.len();
            self.entities.lock().unwrap().extend(entities);
            Ok(n)
        }

        async fn upsert_relationships(&self, _customer_id: &CustomerId, _relationships: Vec<Relationship>) -> Result<usize, IngestionError> {
            Ok(0)
        }

        async fn n_hop_neighbors(&self, _customer_id: &CustomerId, _start_entity_id: &str, _max_hops: u32) -> Result<Vec<String>, IngestionError> {
            Ok(Vec::new())
        }

        async fn top_entities(&self, _customer_id: &CustomerId, n: usize) -> Result<Vec<Entity>, IngestionError> {
            Ok(self.entities.lock().unwrap().iter().take(n).cloned().collect())
        }

        async fn execute_raw(&self, _customer_id: &CustomerId, _query: &str) -> Result<Json, IngestionError> {
            Ok(Json::Null)
        }
    }

    struct NoopEntityExtractor;

    #[async_trait]
    impl EntityExtractorService for NoopEntityExtractor {
        async fn extract(&self, _document_id: &str, _text: &str) -> Result<(Vec<Entity>, Vec<Relationship>), IngestionError> {
            Ok((Vec::new(), Vec::new()))
        }
    }

    fn build_orchestrator(base: PathBuf) -> Orchestrator {
        Orchestrator::new(
            DeploymentMode::Development,
            Arc::new(StubPathResolver { base }),
            Arc::new(HandlerRegistry::with_built_ins()),
            Arc::new(crate::infrastructure::adaptive_handler::FallbackGeneratedHandlerRuntime::new()),
            Arc::new(AlwaysGeneralClassifier),
            Arc::new(LineChunker),
            Arc::new(StubEmbedder { dimension: 4 }),
            Arc::new(crate::infrastructure::lakehouse::SqlxTabularStore::new(
                sqlx::SqlitePool::connect_lazy("sqlite::memory:").unwrap(),
            )),
            Arc::new(crate::infrastructure::lakehouse::FlatVectorStore::new()),
        )
    }

    #[tokio::test]
    async fn a_run_over_a_small_folder_completes() {
        let dir = tempdir().unwrap();
        tokio::fs::write(dir.path().join("hello.txt"), b"line one\nline two\n").await.unwrap();

        let base = tempdir().unwrap();
        let orchestrator = build_orchestrator(base.path().to_path_buf());
        let options = IngestionOptions { max_workers: 2, ..Default::default() };

        let run = orchestrator.run(&[dir.path().to_path_buf()], CustomerId::new("acme"), options).await;

        assert_eq!(run.stage(), IngestionStage::Complete);
        assert_eq!(run.files_discovered, 1);
        assert_eq!(run.files_processed, 1);
        assert_eq!(run.files_failed, 0);
    }

    #[tokio::test]
    async fn a_missing_folder_fails_the_run_without_panicking() {
        let base = tempdir().unwrap();
        let orchestrator = build_orchestrator(base.path().to_path_buf());
        let run = orchestrator
            .run(&[PathBuf::from("/does/not/exist")], CustomerId::new("acme"), IngestionOptions::default())
            .await;

        assert_eq!(run.stage(), IngestionStage::Failed);
    }

    #[tokio::test]
    async fn cancelling_before_the_run_starts_stops_it_at_crawl() {
        let dir = tempdir().unwrap();
        tokio::fs::write(dir.path().join("a.txt"), b"hi").await.unwrap();
        let base = tempdir().unwrap();
        let orchestrator = build_orchestrator(base.path().to_path_buf());

        let cancel = Arc::new(AtomicBool::new(true));
        let options = IngestionOptions { cancel, ..Default::default() };
        let run = orchestrator.run(&[dir.path().to_path_buf()], CustomerId::new("acme"), options).await;

        assert_eq!(run.stage(), IngestionStage::Failed);
    }

    #[tokio::test]
    async fn unsupported_extensions_are_recorded_as_failures_not_panics() {
        let dir = tempdir().unwrap();
        tokio::fs::write(dir.path().join("mystery.zork"), b"???").await.unwrap();
        let base = tempdir().unwrap();
        let orchestrator = build_orchestrator(base.path().to_path_buf());

        let run = orchestrator.run(&[dir.path().to_path_buf()], CustomerId::new("acme"), IngestionOptions::default()).await;

        assert_eq!(run.stage(), IngestionStage::Complete);
        assert_eq!(run.files_discovered, 1);
        assert_eq!(run.files_failed, 1);
        assert_eq!(run.files_processed, 0);
    }

    #[tokio::test]
    async fn entity_extraction_feeds_the_graph_store() {
        let dir = tempdir().unwrap();
        tokio::fs::write(dir.path().join("note.txt"), b"hello").await.unwrap();
        let base = tempdir().unwrap();
        let graph = Arc::new(RecordingGraphStore { entities: Mutex::new(Vec::new()) });
        let orchestrator = build_orchestrator(base.path().to_path_buf())
            .with_entity_extractor(Arc::new(NoopEntityExtractor))
            .with_graph_store(graph.clone());

        let run = orchestrator.run(&[dir.path().to_path_buf()], CustomerId::new("acme"), IngestionOptions::default()).await;

        assert_eq!(run.stage(), IngestionStage::Complete);
        // NoopEntityExtractor never produces entities, so nothing to assert
        // on `graph` beyond the run having completed without erroring.
        let _ = HashMap::<String, String>::new();
    }
}
