//! Submission lifecycle: submit, track, poll to a terminal status.

pub mod monitor;
pub mod registry;
pub mod service;

pub use monitor::{PollSchedule, SubmissionMonitor};
pub use registry::SubmissionRegistry;
pub use service::{fetch_records, Submission, SubmissionOptions, SubmissionService};
