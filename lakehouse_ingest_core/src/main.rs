// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # `lakehouse-ingest` binary
//!
//! CLI entry point. Parses and validates arguments through the bootstrap
//! crate, wires the concrete infrastructure adapters behind the domain's
//! ports, and drives the [`Orchestrator`] (or the lighter `handlers`/
//! `status` commands, which don't need a full orchestrator).

use lakehouse_ingest_bootstrap::{bootstrap_cli, result_to_exit_code, ValidatedCli, ValidatedCommand};
use lakehouse_ingest_core::infrastructure::adaptive_handler::{FallbackGeneratedHandlerRuntime, LlmAdaptiveHandlerGenerator};
use lakehouse_ingest_core::infrastructure::chunker::{ChunkConfig, SmartChunker};
use lakehouse_ingest_core::infrastructure::classifier::{RuleClassifier, TwoTierClassifier};
use lakehouse_ingest_core::infrastructure::config::options_from_env;
use lakehouse_ingest_core::infrastructure::entity_extraction::PatternEntityExtractor;
use lakehouse_ingest_core::infrastructure::handlers::HandlerRegistry;
use lakehouse_ingest_core::infrastructure::lakehouse::{FlatVectorStore, InMemoryGraphStore, SqlxTabularStore};
use lakehouse_ingest_core::infrastructure::llm_provider::{HttpLlmProvider, LlmProviderConfig};
use lakehouse_ingest_core::infrastructure::logging::init_tracing;
use lakehouse_ingest_core::infrastructure::path_resolver::FsPathResolver;
use lakehouse_ingest_core::infrastructure::structured_extractor::LlmStructuredExtractor;
use lakehouse_ingest_core::{IngestionRun, Orchestrator};
use lakehouse_ingest_domain::entities::FileDescriptor;
use lakehouse_ingest_domain::error::IngestionError;
use lakehouse_ingest_domain::services::{AdaptiveHandlerGenerator, ClassifierService, StructuredExtractorService};
use lakehouse_ingest_domain::value_objects::{CustomerId, DeploymentMode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Where `ingest` leaves a run's terminal summary for `status` to read
/// back. Not a lakehouse concern - this is CLI-process bookkeeping, so it
/// lives next to `main`, under the OS temp directory rather than a
/// customer's resolved paths.
fn run_record_path(run_id: &str) -> PathBuf {
    std::env::temp_dir().join("lakehouse-ingest-runs").join(format!("{run_id}.json"))
}

#[derive(Debug, Serialize, Deserialize)]
struct RunRecord {
    id: String,
    customer_id: String,
    stage: String,
    files_discovered: usize,
    files_processed: usize,
    files_failed: usize,
    errors: Vec<String>,
}

impl From<&IngestionRun> for RunRecord {
    fn from(run: &IngestionRun) -> Self {
        Self {
            id: run.id.clone(),
            customer_id: run.customer_id.as_str().to_string(),
            stage: format!("{:?}", run.stage()),
            files_discovered: run.files_discovered,
            files_processed: run.files_processed,
            files_failed: run.files_failed,
            errors: run.retained_errors().iter().cloned().collect(),
        }
    }
}

fn persist_run_record(run: &IngestionRun) -> Result<(), IngestionError> {
    let record = RunRecord::from(run);
    let path = run_record_path(&run.id);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec_pretty(&record)?;
    std::fs::write(&path, json)?;
    Ok(())
}

fn load_run_record(run_id: &str) -> Result<RunRecord, IngestionError> {
    let path = run_record_path(run_id);
    let bytes = std::fs::read(&path)
        .map_err(|_| IngestionError::UserInput(format!("no recorded run with id {run_id}")))?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn run_ingest(
    cli: &ValidatedCli,
    folders: Vec<PathBuf>,
    customer: String,
    max_workers: Option<usize>,
    max_crawl_depth: Option<u32>,
    no_structured_extraction: bool,
    no_entity_extraction: bool,
) -> Result<(), IngestionError> {
    let deployment_mode = DeploymentMode::from_env();
    let path_resolver = Arc::new(FsPathResolver::new(deployment_mode));
    let handler_registry = Arc::new(HandlerRegistry::with_built_ins());
    let handler_runtime = Arc::new(FallbackGeneratedHandlerRuntime::new());

    let llm_provider = LlmProviderConfig::from_env()
        .map(HttpLlmProvider::new)
        .transpose()?
        .map(Arc::new);

    let classifier: Arc<dyn ClassifierService> = match &llm_provider {
        Some(llm) => Arc::new(TwoTierClassifier::new(llm.clone())),
        None => Arc::new(RuleClassifier::new()),
    };

    let chunker = Arc::new(SmartChunker::new(ChunkConfig::default()));

    let embedder = llm_provider.clone().ok_or_else(|| {
        IngestionError::InvalidConfiguration(
            "no embedding provider configured; set LAKEHOUSE_LLM_BASE_URL and LAKEHOUSE_LLM_API_KEY".to_string(),
        )
    })?;

    let database_url = std::env::var("LAKEHOUSE_TABULAR_DB_URL").unwrap_or_else(|_| "sqlite://lakehouse.db".to_string());
    let tabular_store = Arc::new(SqlxTabularStore::connect(&database_url).await?);
    let vector_store = Arc::new(FlatVectorStore::new());
    let graph_store = Arc::new(InMemoryGraphStore::new());

    let mut orchestrator = Orchestrator::new(
        deployment_mode,
        path_resolver,
        handler_registry,
        handler_runtime,
        classifier,
        chunker,
        embedder,
        tabular_store,
        vector_store,
    )
    .with_graph_store(graph_store);

    if let Some(llm) = &llm_provider {
        orchestrator = orchestrator.with_adaptive_generator(Arc::new(LlmAdaptiveHandlerGenerator::new(llm.clone())));
        if !no_structured_extraction {
            let extractor: Arc<dyn StructuredExtractorService> = Arc::new(LlmStructuredExtractor::new(llm.clone()));
            orchestrator = orchestrator.with_structured_extractor(extractor);
        }
        orchestrator = orchestrator.with_metadata_llm(llm.clone());
    }

    if !no_entity_extraction {
        orchestrator = orchestrator.with_entity_extractor(Arc::new(PatternEntityExtractor::new()));
    }

    let mut options = options_from_env();
    if let Some(workers) = max_workers.or(cli.max_extract_workers) {
        options.max_workers = workers;
    }
    if let Some(depth) = max_crawl_depth {
        options.max_crawl_depth = depth;
    }
    options.embed_batch_size = cli.embed_batch_size;

    let run = orchestrator.run(&folders, CustomerId::new(customer), options).await;
    persist_run_record(&run)?;

    info!(
        run_id = %run.id,
        discovered = run.files_discovered,
        processed = run.files_processed,
        failed = run.files_failed,
        "ingestion run finished"
    );
    println!("{}", run.id);

    if run.files_failed > 0 && run.files_processed == 0 {
        return Err(IngestionError::InternalError(format!(
            "run {} failed every discovered file",
            run.id
        )));
    }
    Ok(())
}

fn run_status(run_id: &str) -> Result<(), IngestionError> {
    let record = load_run_record(run_id)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn run_handlers_list() -> Result<(), IngestionError> {
    let registry = HandlerRegistry::with_built_ins();
    let mut extensions = registry.registered_extensions();
    extensions.sort_unstable();
    for ext in extensions {
        println!("{ext}");
    }
    Ok(())
}

async fn run_handlers_generate(extension: String, sample: PathBuf) -> Result<(), IngestionError> {
    let llm = LlmProviderConfig::from_env()
        .map(HttpLlmProvider::new)
        .transpose()?
        .map(Arc::new)
        .ok_or_else(|| {
            IngestionError::InvalidConfiguration(
                "handler generation needs an LLM provider; set LAKEHOUSE_LLM_BASE_URL and LAKEHOUSE_LLM_API_KEY".to_string(),
            )
        })?;

    let generator = LlmAdaptiveHandlerGenerator::new(llm);
    let bytes = tokio::fs::read(&sample).await?;
    let mut descriptor = FileDescriptor::new(CustomerId::new("handler-generation"), sample.clone(), bytes.len() as u64);
    descriptor.extension = Some(format!(".{}", extension.trim_start_matches('.')));
    let generated = generator.generate(&descriptor, &bytes).await?;

    println!("// generated handler for .{}", generated.extension.trim_start_matches('.'));
    println!("{}", generated.source);
    Ok(())
}

async fn run_application(cli: ValidatedCli) -> Result<(), IngestionError> {
    match cli.command.clone() {
        ValidatedCommand::Ingest {
            folders,
            customer,
            max_workers,
            max_crawl_depth,
            no_structured_extraction,
            no_entity_extraction,
        } => run_ingest(&cli, folders, customer, max_workers, max_crawl_depth, no_structured_extraction, no_entity_extraction).await,
        ValidatedCommand::Status { run_id } => run_status(&run_id),
        ValidatedCommand::HandlersList => run_handlers_list(),
        ValidatedCommand::HandlersGenerate { extension, sample } => run_handlers_generate(extension, sample).await,
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = match bootstrap_cli() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("argument error: {e}");
            return std::process::ExitCode::from(64);
        }
    };

    init_tracing(cli.json_logs);

    result_to_exit_code(run_application(cli).await)
}
