//! In-memory view of submissions started by this process.

use std::sync::Arc;

use armlink_domain::{SubmissionState, SubmissionStatus};
use chrono::Utc;
use dashmap::DashMap;

/// Shared map of submission id → latest state.
///
/// Nothing here is persisted; the CRM record remains the durable copy of
/// the submission id and terminal status.
#[derive(Debug, Clone, Default)]
pub struct SubmissionRegistry {
    states: Arc<DashMap<String, SubmissionState>>,
}

impl SubmissionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, state: SubmissionState) {
        self.states.insert(state.submission_id.clone(), state);
    }

    pub fn get(&self, submission_id: &str) -> Option<SubmissionState> {
        self.states.get(submission_id).map(|entry| entry.value().clone())
    }

    /// Records one completed poll.
    pub fn record_poll(&self, submission_id: &str, message: Option<String>) {
        if let Some(mut state) = self.states.get_mut(submission_id) {
            state.polls = state.polls.saturating_add(1);
            if message.is_some() {
                state.last_message = message;
            }
            state.updated_at = Utc::now();
        }
    }

    pub fn set_status(&self, submission_id: &str, status: SubmissionStatus) {
        if let Some(mut state) = self.states.get_mut(submission_id) {
            state.status = status;
            state.updated_at = Utc::now();
        }
    }

    /// Number of submissions still being polled.
    pub fn pending_count(&self) -> usize {
        self.states.iter().filter(|entry| !entry.status.is_terminal()).count()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
