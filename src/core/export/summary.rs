//! Export summary and reporting
//!
//! This module defines the structure reported at the end of an export run.

use crate::core::state::RunStatus;
use crate::domain::ids::{ExportId, RunId};
use std::time::Duration;

/// Summary of one export attempt
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Run record of the attempt
    pub run_id: RunId,

    /// Export the attempt belongs to
    pub export_id: ExportId,

    /// Final run status
    pub status: RunStatus,

    /// Batches pulled from the source
    pub batches_pulled: u64,

    /// Slices written to the destination
    pub slices_written: u64,

    /// Records written to the destination
    pub records_written: u64,

    /// Wall-clock duration of the attempt
    pub duration: Duration,

    /// Error that ended the attempt, if any
    pub error: Option<String>,
}

impl ExportSummary {
    /// Create an empty summary for a run
    pub fn new(run_id: RunId, export_id: ExportId) -> Self {
        Self {
            run_id,
            export_id,
            status: RunStatus::Starting,
            batches_pulled: 0,
            slices_written: 0,
            records_written: 0,
            duration: Duration::from_secs(0),
            error: None,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Check if the run completed
    pub fn is_successful(&self) -> bool {
        self.status == RunStatus::Completed
    }

    pub fn records_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs == 0.0 {
            return self.records_written as f64;
        }
        self.records_written as f64 / secs
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            export_id = %self.export_id,
            status = %self.status,
            batches_pulled = self.batches_pulled,
            slices_written = self.slices_written,
            records_written = self.records_written,
            duration_ms = self.duration.as_millis() as u64,
            records_per_second = format!("{:.1}", self.records_per_second()),
            "Export finished"
        );

        if let Some(error) = &self.error {
            tracing::warn!(run_id = %self.run_id, error = %error, "Export ended with error");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_summary() {
        let summary = ExportSummary::new(RunId::generate(), ExportId::generate());
        assert_eq!(summary.status, RunStatus::Starting);
        assert_eq!(summary.records_written, 0);
        assert!(!summary.is_successful());
    }

    #[test]
    fn test_records_per_second() {
        let mut summary = ExportSummary::new(RunId::generate(), ExportId::generate())
            .with_duration(Duration::from_secs(2));
        summary.records_written = 100;
        assert!((summary.records_per_second() - 50.0).abs() < f64::EPSILON);

        summary.status = RunStatus::Completed;
        assert!(summary.is_successful());
    }
}
