//! Aggregates: consistency boundaries that own the invariants spanning
//! several entities - here, the lifecycle of a single ingestion run.

pub mod ingestion_run;

pub use ingestion_run::{IngestionRun, IngestionStage};
