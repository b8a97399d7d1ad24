// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! Hierarchical error type for the ingestion domain. Errors are categorized
//! so the orchestrator can decide, per spec, whether a failure belongs to a
//! single file/document (captured and counted) or the run as a whole
//! (propagated and terminal).
//!
//! ## Categories
//!
//! - **User input**: bad CLI arguments, missing folders.
//! - **Extraction / Classification / StructuredExtraction**: per-document
//!   failures, always recoverable at the orchestrator level.
//! - **StoreWrite**: retryable infrastructure failures against a store.
//! - **FatalInvariant**: programming-error-class violations (unsafe path
//!   resolution, embedding dimension mismatch) - not recoverable, should
//!   stop the run.

use thiserror::Error;

/// Domain-specific errors for the ingestion system.
#[derive(Error, Debug, Clone)]
pub enum IngestionError {
    #[error("invalid user input: {0}")]
    UserInput(String),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("unsupported file: {0}")]
    Unsupported(String),

    #[error("classification failed: {0}")]
    Classification(String),

    #[error("structured extraction failed: {0}")]
    StructuredExtraction(String),

    #[error("store write failed: {0}")]
    StoreWrite(String),

    #[error("fatal invariant violated: {0}")]
    FatalInvariant(String),

    #[error("configuration error: {0}")]
    InvalidConfiguration(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("timeout: {0}")]
    TimeoutError(String),

    #[error("cancelled: {0}")]
    Cancelled(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl IngestionError {
    pub fn user_input(msg: impl Into<String>) -> Self {
        Self::UserInput(msg.into())
    }

    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    pub fn classification(msg: impl Into<String>) -> Self {
        Self::Classification(msg.into())
    }

    pub fn structured_extraction(msg: impl Into<String>) -> Self {
        Self::StructuredExtraction(msg.into())
    }

    pub fn store_write(msg: impl Into<String>) -> Self {
        Self::StoreWrite(msg.into())
    }

    pub fn fatal_invariant(msg: impl Into<String>) -> Self {
        Self::FatalInvariant(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Per-document failures that the orchestrator records on the run and
    /// continues past, rather than aborting the run.
    pub fn is_per_document(&self) -> bool {
        matches!(
            self,
            IngestionError::Extraction(_)
                | IngestionError::Unsupported(_)
                | IngestionError::Classification(_)
                | IngestionError::StructuredExtraction(_)
                | IngestionError::TimeoutError(_)
        )
    }

    /// Infrastructure failures worth retrying a bounded number of times
    /// before promoting them to a run failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            IngestionError::StoreWrite(_) | IngestionError::TimeoutError(_) | IngestionError::IoError(_)
        )
    }

    /// Assertion-class violations: unsafe path resolution, a vector
    /// dimension mismatch. These are programming errors, not conditions to
    /// retry around.
    pub fn is_fatal(&self) -> bool {
        matches!(self, IngestionError::FatalInvariant(_))
    }

    pub fn category(&self) -> &'static str {
        match self {
            IngestionError::UserInput(_) => "user_input",
            IngestionError::Extraction(_) => "extraction",
            IngestionError::Unsupported(_) => "unsupported",
            IngestionError::Classification(_) => "classification",
            IngestionError::StructuredExtraction(_) => "structured_extraction",
            IngestionError::StoreWrite(_) => "store_write",
            IngestionError::FatalInvariant(_) => "fatal_invariant",
            IngestionError::InvalidConfiguration(_) => "configuration",
            IngestionError::IoError(_) => "io",
            IngestionError::DatabaseError(_) => "database",
            IngestionError::SerializationError(_) => "serialization",
            IngestionError::TimeoutError(_) => "timeout",
            IngestionError::Cancelled(_) => "cancellation",
            IngestionError::InternalError(_) => "internal",
        }
    }
}

impl From<std::io::Error> for IngestionError {
    fn from(err: std::io::Error) -> Self {
        IngestionError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for IngestionError {
    fn from(err: serde_json::Error) -> Self {
        IngestionError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_document_errors_dont_abort_a_run() {
        assert!(IngestionError::extraction("bad pdf").is_per_document());
        assert!(IngestionError::classification("no llm").is_per_document());
        assert!(!IngestionError::fatal_invariant("boom").is_per_document());
    }

    #[test]
    fn fatal_invariant_is_never_recoverable() {
        let err = IngestionError::fatal_invariant("vector dim mismatch");
        assert!(err.is_fatal());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn category_is_stable() {
        assert_eq!(IngestionError::store_write("x").category(), "store_write");
    }
}
