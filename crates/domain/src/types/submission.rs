//! Submission tracking types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{STATUS_DONE, STATUS_ERROR_MARKER};
use crate::types::report::{CaseId, ReportKind};

/// Lifecycle of a submission at the reporting service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Done,
    Error,
    TimedOut,
    /// The monitor was stopped before a terminal status was observed.
    Cancelled,
}

impl SubmissionStatus {
    /// Classifies a `statusMessage` returned by the reporting service.
    pub fn from_status_message(message: &str) -> Self {
        let message = message.trim();
        if message == STATUS_DONE {
            Self::Done
        } else if message.contains(STATUS_ERROR_MARKER) {
            Self::Error
        } else {
            Self::Pending
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Progress of one submission, as tracked by its monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionState {
    pub record_id: CaseId,
    pub kind: ReportKind,
    pub submission_id: String,
    pub status: SubmissionStatus,
    pub polls: u32,
    /// Last status message received, if any.
    pub last_message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl SubmissionState {
    pub fn pending(record_id: CaseId, kind: ReportKind, submission_id: impl Into<String>) -> Self {
        Self {
            record_id,
            kind,
            submission_id: submission_id.into(),
            status: SubmissionStatus::Pending,
            polls: 0,
            last_message: None,
            updated_at: Utc::now(),
        }
    }
}

/// Synchronous acknowledgement returned to the caller of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub submission_id: String,
    pub sent_xml: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_status_messages() {
        assert_eq!(SubmissionStatus::from_status_message("DONE"), SubmissionStatus::Done);
        assert_eq!(SubmissionStatus::from_status_message(" DONE\n"), SubmissionStatus::Done);
        assert_eq!(
            SubmissionStatus::from_status_message("ERROR: invalid counselor id"),
            SubmissionStatus::Error
        );
        assert_eq!(SubmissionStatus::from_status_message("PENDING"), SubmissionStatus::Pending);
        assert_eq!(SubmissionStatus::from_status_message("DONE WITH NOTES"), SubmissionStatus::Pending);
    }

    #[test]
    fn receipt_uses_camel_case_keys() {
        let receipt = SubmissionReceipt { submission_id: "991".into(), sent_xml: "<x/>".into() };
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["submissionId"], "991");
        assert_eq!(json["sentXml"], "<x/>");
    }
}
