// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Parser
//!
//! Command-line interface parsing using clap. Defines the CLI structure;
//! security validation happens in [`super::validator`] after parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "lakehouse-ingest")]
#[command(about = concat!("Customer data ingestion for the lakehouse, v", env!("CARGO_PKG_VERSION")))]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the number of concurrent extract-stage workers
    #[arg(long)]
    pub max_extract_workers: Option<usize>,

    /// Override the number of concurrent crawl/classify I/O operations
    #[arg(long)]
    pub max_io_concurrency: Option<usize>,

    /// JSON log output instead of human-readable
    #[arg(long)]
    pub json_logs: bool,

    /// Embedding request batch size
    #[arg(long, default_value = "32")]
    pub embed_batch_size: usize,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Ingest one or more folders of a customer's uploaded files
    Ingest {
        /// Folders to crawl (may be repeated)
        #[arg(short, long, required = true, num_args = 1..)]
        folders: Vec<PathBuf>,

        /// Customer identifier the ingested documents belong to
        #[arg(short, long)]
        customer: String,

        /// Maximum number of files processed concurrently
        #[arg(long)]
        max_workers: Option<usize>,

        /// Maximum crawl depth below each root folder
        #[arg(long)]
        max_crawl_depth: Option<u32>,

        /// Skip structured-record extraction even for Products-category files
        #[arg(long)]
        no_structured_extraction: bool,

        /// Skip named-entity extraction and graph upserts
        #[arg(long)]
        no_entity_extraction: bool,
    },

    /// Report the terminal status of a prior ingestion run
    Status {
        /// Run identifier returned by `ingest`
        run_id: String,
    },

    /// Inspect or extend the built-in and adaptively generated handler set
    Handlers {
        #[command(subcommand)]
        command: HandlersCommand,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum HandlersCommand {
    /// List every extension currently routed to a handler
    List,

    /// Generate (and persist) a handler for an extension none of the
    /// built-ins cover, using a sample file to ground the generation
    Generate {
        /// File extension to generate a handler for, e.g. "log" or "ndjson"
        extension: String,

        /// Sample file used to validate the generated handler
        #[arg(short, long)]
        sample: PathBuf,
    },
}

/// Parses CLI arguments.
///
/// # Panics
/// clap exits the process with a usage message if parsing fails.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_command_parses_repeated_folders() {
        let cli = Cli::parse_from([
            "lakehouse-ingest",
            "ingest",
            "--folders",
            "/data/a",
            "/data/b",
            "--customer",
            "acme",
        ]);

        match cli.command {
            Commands::Ingest { folders, customer, .. } => {
                assert_eq!(folders.len(), 2);
                assert_eq!(customer, "acme");
            }
            other => panic!("expected Ingest, got {other:?}"),
        }
    }

    #[test]
    fn handlers_list_parses() {
        let cli = Cli::parse_from(["lakehouse-ingest", "handlers", "list"]);
        assert!(matches!(cli.command, Commands::Handlers { command: HandlersCommand::List }));
    }
}
