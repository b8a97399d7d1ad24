// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Bootstrap Module
//!
//! Sits **outside** the enterprise application layers (domain,
//! application, infrastructure) and provides:
//!
//! - **Entry point** - CLI parsing and validated configuration
//! - **Platform abstraction** - OS-specific operations (POSIX vs Windows)
//! - **Signal handling** - graceful shutdown (SIGTERM, SIGINT, SIGHUP)
//! - **Argument parsing** - secure CLI argument validation
//! - **Error handling** - Unix exit code mapping
//! - **Async coordination** - shutdown coordination and cancellation
//!
//! ## Key Design Principles
//!
//! 1. **Separation from enterprise layers** - bootstrap can see the core
//!    crate's types; the core crate never depends back on bootstrap
//!    internals beyond what this crate exports.
//! 2. **Platform abstraction** - OS-specific functionality lives behind
//!    the [`Platform`](platform::Platform) trait, selected at compile time.
//! 3. **Graceful shutdown** - signal handlers drive a
//!    [`ShutdownCoordinator`](shutdown::ShutdownCoordinator) with a grace
//!    period and timeout enforcement.
//! 4. **Security first** - [`cli::SecureArgParser`] validates every path
//!    and numeric argument before it reaches application code.
//!
//! ## Usage
//!
//! ```no_run
//! use lakehouse_ingest_bootstrap::{bootstrap_cli, result_to_exit_code};
//!
//! #[tokio::main]
//! async fn main() -> std::process::ExitCode {
//!     let validated_cli = match bootstrap_cli() {
//!         Ok(cli) => cli,
//!         Err(e) => {
//!             eprintln!("CLI error: {e}");
//!             return std::process::ExitCode::from(64);
//!         }
//!     };
//!
//!     let result: Result<(), std::io::Error> = run_application(validated_cli).await;
//!     result_to_exit_code(result)
//! }
//!
//! async fn run_application(_cli: lakehouse_ingest_bootstrap::ValidatedCli) -> Result<(), std::io::Error> {
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod exit_code;
pub mod logger;
pub mod platform;
pub mod shutdown;
pub mod signals;

pub use cli::{parse_and_validate, ValidatedCli, ValidatedCommand};
pub use exit_code::{map_error_to_exit_code, result_to_exit_code, ExitCode};

/// Parses and validates CLI arguments - the main bootstrap entry point.
///
/// Clap handles `--help`/`--version` and exits the process automatically.
///
/// # Errors
/// Returns `cli::ParseError` if parsing or validation fails.
pub fn bootstrap_cli() -> Result<ValidatedCli, cli::ParseError> {
    cli::parse_and_validate()
}
