//! Status poll loop for one submission.
//!
//! After a submission id is issued the monitor polls `getSubmissionInfo`
//! until the service reports a terminal status:
//! - `DONE` → write `DONE` back to the case record.
//! - any message containing `ERROR` → write the raw response body back.
//! - anything else → keep polling.
//!
//! Polls run strictly one at a time. The delay between polls grows by
//! `multiplier` up to `max_interval`; after `max_attempts` polls without a
//! terminal status the monitor writes `TIMEOUT` and returns a
//! [`ArmLinkError::Timeout`]. Failed polls count as attempts.

use std::sync::Arc;
use std::time::Duration;

use armlink_domain::constants::{CASE_OBJECT, STATUS_DONE, STATUS_TIMEOUT};
use armlink_domain::{
    ArmLinkError, IntegrationSettings, MonitorConfig, Result, SubmissionState, SubmissionStatus,
};
use serde_json::{Map, Value};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::registry::SubmissionRegistry;
use crate::crm_ports::CrmClient;
use crate::reporting_ports::ReportingGateway;
use crate::soap;

/// Poll timing for a monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct PollSchedule {
    /// Delay before the first poll
    pub interval: Duration,
    /// Ceiling for the growing delay
    pub max_interval: Duration,
    pub max_attempts: u32,
    pub multiplier: f64,
    /// Upper bound on a single status request
    pub poll_timeout: Duration,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::from(&MonitorConfig::default())
    }
}

impl From<&MonitorConfig> for PollSchedule {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.poll_interval_secs),
            max_interval: Duration::from_secs(config.max_poll_interval_secs.max(config.poll_interval_secs)),
            max_attempts: config.max_poll_attempts.max(1),
            multiplier: config.backoff_multiplier.max(1.0),
            poll_timeout: Duration::from_secs(120),
        }
    }
}

impl PollSchedule {
    /// Delay after `current`, capped at `max_interval`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.multiplier)
            .map_or(self.max_interval, |next| next.min(self.max_interval))
    }
}

/// Outcome of one status poll.
#[derive(Debug)]
struct PollOutcome {
    status: SubmissionStatus,
    message: String,
    body: String,
}

/// Drives one submission to a terminal status.
pub struct SubmissionMonitor {
    crm: Arc<dyn CrmClient>,
    gateway: Arc<dyn ReportingGateway>,
    registry: SubmissionRegistry,
    settings: IntegrationSettings,
    schedule: PollSchedule,
    state: SubmissionState,
}

impl SubmissionMonitor {
    pub fn new(
        crm: Arc<dyn CrmClient>,
        gateway: Arc<dyn ReportingGateway>,
        registry: SubmissionRegistry,
        settings: IntegrationSettings,
        schedule: PollSchedule,
        state: SubmissionState,
    ) -> Self {
        Self { crm, gateway, registry, settings, schedule, state }
    }

    /// Tracks the submission on its own task: writes the submission id to the
    /// case record, registers the state, then polls until terminal.
    ///
    /// The returned receiver fires once the submission is registered, before
    /// the first poll. The task keeps running when the caller goes away.
    pub fn spawn(
        self,
        cancel: CancellationToken,
    ) -> (JoinHandle<Result<SubmissionStatus>>, oneshot::Receiver<()>) {
        let (registered_tx, registered_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            self.record_submission_id().await;
            self.registry.insert(self.state.clone());
            // the caller may have been dropped; tracking continues regardless
            let _ = registered_tx.send(());
            self.run(cancel).await
        });
        (handle, registered_rx)
    }

    /// A failed write is logged; the submission exists remotely so polling
    /// still starts.
    async fn record_submission_id(&self) {
        let mut fields = Map::new();
        fields.insert(
            self.state.kind.submission_id_field().to_string(),
            Value::String(self.state.submission_id.clone()),
        );

        if let Err(e) = self.crm.update_record(CASE_OBJECT, self.state.record_id.as_str(), fields).await {
            warn!(submission_id = %self.state.submission_id, error = %e, "Failed to write submission id back");
        }
    }

    #[instrument(
        skip_all,
        fields(submission_id = %self.state.submission_id, record_id = %self.state.record_id, kind = %self.state.kind)
    )]
    pub async fn run(self, cancel: CancellationToken) -> Result<SubmissionStatus> {
        let envelope = soap::status_envelope(&self.settings, &self.state.submission_id);
        let mut delay = self.schedule.interval;

        for attempt in 1..=self.schedule.max_attempts {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!(attempt, "Submission monitor cancelled");
                    self.registry.set_status(&self.state.submission_id, SubmissionStatus::Cancelled);
                    return Ok(SubmissionStatus::Cancelled);
                }
                () = tokio::time::sleep(delay) => {}
            }

            match tokio::time::timeout(self.schedule.poll_timeout, self.poll(&envelope)).await {
                Ok(Ok(outcome)) => {
                    self.registry.record_poll(&self.state.submission_id, Some(outcome.message.clone()));
                    match outcome.status {
                        SubmissionStatus::Done => {
                            self.finish(SubmissionStatus::Done, STATUS_DONE).await;
                            return Ok(SubmissionStatus::Done);
                        }
                        SubmissionStatus::Error => {
                            warn!(attempt, message = %outcome.message, "Reporting service rejected submission");
                            self.finish(SubmissionStatus::Error, &outcome.body).await;
                            return Ok(SubmissionStatus::Error);
                        }
                        _ => debug!(attempt, message = %outcome.message, "Submission still processing"),
                    }
                }
                Ok(Err(e)) => {
                    self.registry.record_poll(&self.state.submission_id, None);
                    warn!(attempt, error = %e, "Status poll failed");
                }
                Err(_) => {
                    self.registry.record_poll(&self.state.submission_id, None);
                    warn!(attempt, timeout_secs = self.schedule.poll_timeout.as_secs(), "Status poll timed out");
                }
            }

            delay = self.schedule.next_delay(delay);
        }

        error!(attempts = self.schedule.max_attempts, "No terminal status before attempt limit");
        self.finish(SubmissionStatus::TimedOut, STATUS_TIMEOUT).await;
        Err(ArmLinkError::Timeout(format!(
            "submission {} not complete after {} status polls",
            self.state.submission_id, self.schedule.max_attempts
        )))
    }

    async fn poll(&self, envelope: &str) -> Result<PollOutcome> {
        let body = self.gateway.post_envelope(&self.settings, envelope.to_string()).await?;
        let message = soap::parse_status_message(&body)?;
        Ok(PollOutcome { status: SubmissionStatus::from_status_message(&message), message, body })
    }

    /// Records the terminal status locally and writes it to the case record.
    /// A failed write is logged; the submission is terminal either way.
    async fn finish(&self, status: SubmissionStatus, stored: &str) {
        self.registry.set_status(&self.state.submission_id, status);

        let mut fields = Map::new();
        fields.insert(
            self.state.kind.submission_status_field().to_string(),
            Value::String(stored.to_string()),
        );

        match self.crm.update_record(CASE_OBJECT, self.state.record_id.as_str(), fields).await {
            Ok(()) => info!(status = ?status, "Submission status written back"),
            Err(e) => error!(status = ?status, error = %e, "Failed to write submission status back"),
        }
    }
}
