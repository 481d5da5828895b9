//! Domain types and models

pub mod auth;
pub mod record;
pub mod report;
pub mod submission;

pub use auth::{CrmSession, LoginChallenge, OAuthSettings};
pub use record::{FieldValue, QueryPage, Record};
pub use report::{CaseId, IntegrationSettings, ReportKind};
pub use submission::{SubmissionReceipt, SubmissionState, SubmissionStatus};
