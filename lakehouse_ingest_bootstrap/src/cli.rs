// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! Bootstrap-layer CLI handling with security-first design.
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  1. parser::parse_cli()             │  Parse CLI with clap
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  2. validate_cli()                  │  Security validation
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  3. ValidatedCli                    │  Safe, validated config
//! └─────────────────────────────────────┘
//! ```

pub mod parser;
pub mod validator;

pub use parser::{parse_cli, Cli, Commands, HandlersCommand};
pub use validator::{ParseError, SecureArgParser};

use std::path::PathBuf;

/// Validated CLI configuration: every path canonicalized, every numeric
/// argument range-checked.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
    pub config: Option<PathBuf>,
    pub max_extract_workers: Option<usize>,
    pub max_io_concurrency: Option<usize>,
    pub json_logs: bool,
    pub embed_batch_size: usize,
}

#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Ingest {
        folders: Vec<PathBuf>,
        customer: String,
        max_workers: Option<usize>,
        max_crawl_depth: Option<u32>,
        no_structured_extraction: bool,
        no_entity_extraction: bool,
    },
    Status {
        run_id: String,
    },
    HandlersList,
    HandlersGenerate {
        extension: String,
        sample: PathBuf,
    },
}

/// Parses then validates CLI arguments.
///
/// # Errors
/// Returns `ParseError` if any validation fails.
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = parse_cli();
    validate_cli(cli)
}

fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let config = if let Some(ref path) = cli.config {
        SecureArgParser::validate_argument(&path.to_string_lossy())?;
        Some(path.clone())
    } else {
        None
    };

    if cli.embed_batch_size == 0 {
        return Err(ParseError::InvalidValue {
            arg: "embed-batch-size".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }

    if let Some(workers) = cli.max_extract_workers {
        if workers == 0 || workers > 128 {
            return Err(ParseError::InvalidValue {
                arg: "max-extract-workers".to_string(),
                reason: "must be between 1 and 128".to_string(),
            });
        }
    }

    if let Some(concurrency) = cli.max_io_concurrency {
        if concurrency == 0 || concurrency > 256 {
            return Err(ParseError::InvalidValue {
                arg: "max-io-concurrency".to_string(),
                reason: "must be between 1 and 256".to_string(),
            });
        }
    }

    let command = match cli.command {
        Commands::Ingest {
            folders,
            customer,
            max_workers,
            max_crawl_depth,
            no_structured_extraction,
            no_entity_extraction,
        } => {
            if folders.is_empty() {
                return Err(ParseError::MissingArgument("folders".to_string()));
            }
            let mut validated_folders = Vec::with_capacity(folders.len());
            for folder in &folders {
                validated_folders.push(SecureArgParser::validate_path(&folder.to_string_lossy())?);
            }

            SecureArgParser::validate_argument(&customer)?;

            if let Some(w) = max_workers {
                if w == 0 || w > 128 {
                    return Err(ParseError::InvalidValue {
                        arg: "max-workers".to_string(),
                        reason: "must be between 1 and 128".to_string(),
                    });
                }
            }

            ValidatedCommand::Ingest {
                folders: validated_folders,
                customer,
                max_workers,
                max_crawl_depth,
                no_structured_extraction,
                no_entity_extraction,
            }
        }
        Commands::Status { run_id } => {
            SecureArgParser::validate_argument(&run_id)?;
            ValidatedCommand::Status { run_id }
        }
        Commands::Handlers { command } => match command {
            HandlersCommand::List => ValidatedCommand::HandlersList,
            HandlersCommand::Generate { extension, sample } => {
                SecureArgParser::validate_argument(&extension)?;
                let validated_sample = SecureArgParser::validate_path(&sample.to_string_lossy())?;
                ValidatedCommand::HandlersGenerate {
                    extension,
                    sample: validated_sample,
                }
            }
        },
    };

    Ok(ValidatedCli {
        command,
        verbose: cli.verbose,
        config,
        max_extract_workers: cli.max_extract_workers,
        max_io_concurrency: cli.max_io_concurrency,
        json_logs: cli.json_logs,
        embed_batch_size: cli.embed_batch_size,
    })
}
