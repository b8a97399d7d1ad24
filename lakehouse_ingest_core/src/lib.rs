// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Lakehouse Ingest
//!
//! Customer data ingestion core for a multi-tenant business-AI platform:
//! crawls a customer's uploaded folders, classifies each file, extracts
//! its text (via a fixed set of built-in handlers or an adaptively
//! generated one for extensions none of them cover), chunks, optionally
//! pulls out structured records and named entities, embeds, and loads the
//! results into per-customer tabular, vector, and graph stores.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Application Layer                           │
//! │  (Orchestrator: drives one customer's run end to end)        │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Domain Layer                              │
//! │  (lakehouse_ingest_domain: aggregate, entities, ports)        │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Infrastructure Layer                           │
//! │  (crawl/classify/chunk/extract adapters, lakehouse stores,    │
//! │   config, logging, metrics)                                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The CLI entry point lives in the `lakehouse-ingest` binary
//! (`src/main.rs`), built on the platform/signal-handling primitives in
//! the `lakehouse-ingest-bootstrap` crate.

pub mod application;
pub mod infrastructure;

// Tests are organized as:
// - Unit tests: #[cfg(test)] modules within each source file
// - Integration tests: separate files in tests/ directory

pub use application::orchestrator::{IngestionOptions, Orchestrator};

// Re-export domain types for convenient access
pub use lakehouse_ingest_domain::{
    Chunk, DeploymentContext, EmbeddingRecord, Entity, FileDescriptor, IngestionError, IngestionObserver,
    IngestionRun, IngestionStage, Relationship, TabularRecord,
};
