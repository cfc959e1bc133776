//! Run lifecycle record
//!
//! One [`ExportRun`] exists per export attempt. It is created with status
//! [`RunStatus::Starting`] before any batch is streamed and is moved to a
//! terminal status by whoever orchestrates the attempt.

use crate::domain::ids::{ExportId, RunId};
use crate::domain::interval::DataInterval;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an export run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// Record created, streaming not yet confirmed
    Starting,
    /// Batches are flowing
    Running,
    /// All batches delivered
    Completed,
    /// The attempt failed; a retry creates a new run
    Failed,
    /// The attempt was cancelled by a shutdown signal
    Cancelled,
}

impl RunStatus {
    /// Whether no further transitions are allowed
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Cancelled
        )
    }

    /// Allowed moves: `STARTING -> RUNNING -> COMPLETED | FAILED | CANCELLED`.
    ///
    /// A run that never reached `RUNNING` may still fail or be cancelled.
    pub fn can_transition_to(&self, next: RunStatus) -> bool {
        match (self, next) {
            (RunStatus::Starting, RunStatus::Running) => true,
            (RunStatus::Starting, RunStatus::Failed | RunStatus::Cancelled) => true,
            (
                RunStatus::Running,
                RunStatus::Completed | RunStatus::Failed | RunStatus::Cancelled,
            ) => true,
            _ => false,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Starting => "STARTING",
            RunStatus::Running => "RUNNING",
            RunStatus::Completed => "COMPLETED",
            RunStatus::Failed => "FAILED",
            RunStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// Persisted bookkeeping for one export attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRun {
    /// Unique id of this attempt
    pub id: RunId,

    /// Export configuration this run belongs to
    pub export_id: ExportId,

    /// Interval of data the run exports
    pub data_interval: DataInterval,

    /// Current lifecycle status
    pub status: RunStatus,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// When the record was last modified
    pub last_updated_at: DateTime<Utc>,

    /// Records delivered to the destination, set when the run ends
    pub records_completed: Option<u64>,

    /// Error message of the most recent failure
    pub latest_error: Option<String>,
}

impl ExportRun {
    /// Apply a status update, enforcing the lifecycle order
    pub fn apply(&mut self, update: RunUpdate) -> Result<(), String> {
        if !self.status.can_transition_to(update.status) {
            return Err(format!(
                "Run {} cannot move from {} to {}",
                self.id, self.status, update.status
            ));
        }

        self.status = update.status;
        self.last_updated_at = Utc::now();
        if update.records_completed.is_some() {
            self.records_completed = update.records_completed;
        }
        if update.latest_error.is_some() {
            self.latest_error = update.latest_error;
        }
        Ok(())
    }
}

/// A status change plus the bookkeeping that goes with it
#[derive(Debug, Clone, PartialEq)]
pub struct RunUpdate {
    pub status: RunStatus,
    pub records_completed: Option<u64>,
    pub latest_error: Option<String>,
}

impl RunUpdate {
    pub fn running() -> Self {
        Self::status(RunStatus::Running)
    }

    pub fn completed(records_completed: u64) -> Self {
        Self {
            records_completed: Some(records_completed),
            ..Self::status(RunStatus::Completed)
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            latest_error: Some(error.into()),
            ..Self::status(RunStatus::Failed)
        }
    }

    pub fn cancelled() -> Self {
        Self::status(RunStatus::Cancelled)
    }

    /// Records how many records made it through before the run ended
    pub fn with_records_completed(mut self, count: u64) -> Self {
        self.records_completed = Some(count);
        self
    }

    fn status(status: RunStatus) -> Self {
        Self {
            status,
            records_completed: None,
            latest_error: None,
        }
    }
}

/// Builder for [`ExportRun`]
pub struct ExportRunBuilder {
    export_id: ExportId,
    data_interval: DataInterval,
    status: RunStatus,
    created_at: Option<DateTime<Utc>>,
}

impl ExportRunBuilder {
    pub fn new(export_id: ExportId, data_interval: DataInterval) -> Self {
        Self {
            export_id,
            data_interval,
            status: RunStatus::Starting,
            created_at: None,
        }
    }

    /// Set the initial status
    pub fn status(mut self, status: RunStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the creation timestamp
    pub fn created_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.created_at = Some(timestamp);
        self
    }

    /// Build the run with a freshly generated id
    pub fn build(self) -> ExportRun {
        let now = Utc::now();
        let created_at = self.created_at.unwrap_or(now);

        ExportRun {
            id: RunId::generate(),
            export_id: self.export_id,
            data_interval: self.data_interval,
            status: self.status,
            created_at,
            last_updated_at: created_at,
            records_completed: None,
            latest_error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn interval() -> DataInterval {
        DataInterval::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 1, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_builder_defaults_to_starting() {
        let run = ExportRunBuilder::new(ExportId::generate(), interval()).build();
        assert_eq!(run.status, RunStatus::Starting);
        assert!(run.records_completed.is_none());
        assert!(run.latest_error.is_none());
        assert_eq!(run.created_at, run.last_updated_at);
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut run = ExportRunBuilder::new(ExportId::generate(), interval()).build();

        run.apply(RunUpdate::running()).unwrap();
        assert_eq!(run.status, RunStatus::Running);

        run.apply(RunUpdate::completed(100)).unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.records_completed, Some(100));
        assert!(run.status.is_terminal());
    }

    #[test]
    fn test_failure_records_error() {
        let mut run = ExportRunBuilder::new(ExportId::generate(), interval()).build();
        run.apply(RunUpdate::running()).unwrap();
        run.apply(RunUpdate::failed("Malformed stream").with_records_completed(7))
            .unwrap();

        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.latest_error.as_deref(), Some("Malformed stream"));
        assert_eq!(run.records_completed, Some(7));
    }

    #[test]
    fn test_terminal_runs_are_not_reopened() {
        let mut run = ExportRunBuilder::new(ExportId::generate(), interval()).build();
        run.apply(RunUpdate::failed("boom")).unwrap();

        let result = run.apply(RunUpdate::running());
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("cannot move from FAILED to RUNNING"));
    }

    #[test]
    fn test_starting_cannot_complete_directly() {
        assert!(!RunStatus::Starting.can_transition_to(RunStatus::Completed));
        assert!(RunStatus::Starting.can_transition_to(RunStatus::Cancelled));
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&RunStatus::Starting).unwrap();
        assert_eq!(json, "\"STARTING\"");
        assert_eq!(RunStatus::Cancelled.to_string(), "CANCELLED");
    }
}
