use crate::error::IngestionError;
use crate::value_objects::CustomerId;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// The stages an ingestion run passes through, in order. A run may only
/// advance forward or jump to `Failed`; there is no going back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionStage {
    Pending,
    Crawling,
    Classifying,
    Processing,
    Embedding,
    Loading,
    Complete,
    Failed,
}

impl IngestionStage {
    fn ordinal(self) -> u8 {
        match self {
            IngestionStage::Pending => 0,
            IngestionStage::Crawling => 1,
            IngestionStage::Classifying => 2,
            IngestionStage::Processing => 3,
            IngestionStage::Embedding => 4,
            IngestionStage::Loading => 5,
            IngestionStage::Complete => 6,
            IngestionStage::Failed => 7,
        }
    }
}

/// Bounds the number of per-document errors an `IngestionRun` retains in
/// memory. Beyond this, the count still increments but the oldest detail
/// is dropped - a run ingesting ten thousand malformed files must not
/// retain ten thousand error strings.
const MAX_RETAINED_ERRORS: usize = 10;

/// Aggregate root tracking one customer's ingestion run end to end: which
/// stage it's in, how many files were seen/processed/failed, and a bounded
/// tail of the errors encountered along the way.
#[derive(Debug, Clone)]
pub struct IngestionRun {
    pub id: String,
    pub customer_id: CustomerId,
    stage: IngestionStage,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub files_discovered: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    errors: VecDeque<String>,
    errors_seen: usize,
}

impl IngestionRun {
    pub fn start(id: impl Into<String>, customer_id: CustomerId, started_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            customer_id,
            stage: IngestionStage::Pending,
            started_at,
            finished_at: None,
            files_discovered: 0,
            files_processed: 0,
            files_failed: 0,
            errors: VecDeque::new(),
            errors_seen: 0,
        }
    }

    pub fn stage(&self) -> IngestionStage {
        self.stage
    }

    /// Advances to `next`, rejecting any transition that isn't strictly
    /// forward (or into `Failed`, which is reachable from any stage).
    pub fn advance_to(&mut self, next: IngestionStage) -> Result<(), IngestionError> {
        if next == IngestionStage::Failed || next.ordinal() > self.stage.ordinal() {
            self.stage = next;
            Ok(())
        } else {
            Err(IngestionError::fatal_invariant(format!(
                "cannot advance ingestion run from {:?} to {:?}",
                self.stage, next
            )))
        }
    }

    /// Records a per-document failure. This never transitions the run's
    /// stage - per-document errors are tolerated, not fatal, per the
    /// recoverability classification on `IngestionError`.
    pub fn record_failure(&mut self, finished_at: DateTime<Utc>, detail: impl Into<String>) {
        self.files_failed += 1;
        self.errors_seen += 1;
        if self.errors.len() == MAX_RETAINED_ERRORS {
            self.errors.pop_front();
        }
        self.errors.push_back(detail.into());
        let _ = finished_at;
    }

    pub fn record_success(&mut self) {
        self.files_processed += 1;
    }

    pub fn complete(&mut self, finished_at: DateTime<Utc>) -> Result<(), IngestionError> {
        self.advance_to(IngestionStage::Complete)?;
        self.finished_at = Some(finished_at);
        Ok(())
    }

    pub fn fail(&mut self, finished_at: DateTime<Utc>, reason: impl Into<String>) {
        self.stage = IngestionStage::Failed;
        self.finished_at = Some(finished_at);
        self.record_failure(finished_at, reason);
    }

    /// Errors retained for inspection; bounded at `MAX_RETAINED_ERRORS`
    /// regardless of how many failures actually occurred (see
    /// `errors_seen` for the true count).
    pub fn retained_errors(&self) -> &VecDeque<String> {
        &self.errors
    }

    pub fn errors_seen(&self) -> usize {
        self.errors_seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run() -> IngestionRun {
        IngestionRun::start("run-1", CustomerId::new("acme"), Utc::now())
    }

    #[test]
    fn stages_only_advance_forward() {
        let mut run = run();
        run.advance_to(IngestionStage::Crawling).unwrap();
        assert!(run.advance_to(IngestionStage::Pending).is_err());
    }

    #[test]
    fn failed_is_reachable_from_any_stage() {
        let mut run = run();
        run.advance_to(IngestionStage::Crawling).unwrap();
        assert!(run.advance_to(IngestionStage::Failed).is_ok());
    }

    #[test]
    fn error_retention_is_bounded_but_count_is_not() {
        let mut run = run();
        for i in 0..25 {
            run.record_failure(Utc::now(), format!("error {i}"));
        }
        assert_eq!(run.errors_seen(), 25);
        assert_eq!(run.retained_errors().len(), MAX_RETAINED_ERRORS);
        assert_eq!(run.retained_errors().back().unwrap(), "error 24");
    }
}
