//! Fetch → transform → submit → monitor.

use std::sync::Arc;

use armlink_domain::constants::{DEFAULT_FISCAL_YEAR_ID, DEFAULT_SETTINGS_NAME};
use armlink_domain::{
    ArmLinkError, CaseId, IntegrationSettings, ReportKind, ReportingConfig, Result,
    SubmissionReceipt, SubmissionState, SubmissionStatus,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use super::monitor::{PollSchedule, SubmissionMonitor};
use super::registry::SubmissionRegistry;
use crate::crm_ports::CrmClient;
use crate::fetch::fetch_all;
use crate::report::{form_9902, queries, Form9902Records, ReportRecords};
use crate::reporting_ports::ReportingGateway;
use crate::soap;

/// Settings for submissions that are not stored in the CRM.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOptions {
    pub settings_name: String,
    pub fiscal_year_id: String,
    pub schedule: PollSchedule,
}

impl Default for SubmissionOptions {
    fn default() -> Self {
        Self {
            settings_name: DEFAULT_SETTINGS_NAME.to_string(),
            fiscal_year_id: DEFAULT_FISCAL_YEAR_ID.to_string(),
            schedule: PollSchedule::default(),
        }
    }
}

impl SubmissionOptions {
    pub fn new(reporting: &ReportingConfig, schedule: PollSchedule) -> Self {
        Self {
            settings_name: reporting.settings_name.clone(),
            fiscal_year_id: reporting.fiscal_year_id.clone(),
            schedule,
        }
    }
}

/// A submission accepted by the reporting service, with its monitor task.
pub struct Submission {
    pub receipt: SubmissionReceipt,
    pub monitor: JoinHandle<Result<SubmissionStatus>>,
}

pub struct SubmissionService {
    gateway: Arc<dyn ReportingGateway>,
    registry: SubmissionRegistry,
    options: SubmissionOptions,
    shutdown: CancellationToken,
}

impl SubmissionService {
    pub fn new(
        gateway: Arc<dyn ReportingGateway>,
        registry: SubmissionRegistry,
        options: SubmissionOptions,
    ) -> Self {
        Self { gateway, registry, options, shutdown: CancellationToken::new() }
    }

    pub fn registry(&self) -> &SubmissionRegistry {
        &self.registry
    }

    /// Stops every running monitor. Cancelled monitors do not write back.
    pub fn shutdown(&self) {
        info!(pending = self.registry.pending_count(), "Cancelling submission monitors");
        self.shutdown.cancel();
    }

    /// Reports `case_id` as `kind`.
    ///
    /// Any failure before the reporting service issues a submission id
    /// aborts the whole operation. Once an id exists a detached task writes
    /// it to the case record, registers the submission and monitors it, so
    /// a dropped caller cannot orphan an accepted submission. A failed id
    /// write-back is logged but does not stop monitoring.
    #[instrument(skip_all, fields(kind = %kind, case = %case_id))]
    pub async fn submit(
        &self,
        crm: Arc<dyn CrmClient>,
        kind: ReportKind,
        case_id: CaseId,
    ) -> Result<Submission> {
        let settings = self.load_settings(crm.as_ref()).await?;
        let records = fetch_records(crm.as_ref(), kind, &case_id).await?;
        info!(records = records.len(), "Fetched report records");

        let document = records.render()?;
        let envelope =
            soap::submission_envelope(kind, &settings, &self.options.fiscal_year_id, &document);

        let body = self.gateway.post_envelope(&settings, envelope).await.map_err(|e| {
            error!(error = %e, "Submission POST failed");
            e
        })?;
        let submission_id = soap::parse_submission_id(&body).map_err(|e| {
            error!(error = %e, "Submission response carried no id");
            e
        })?;
        info!(submission_id = %submission_id, "Submission accepted");

        let state = SubmissionState::pending(case_id, kind, submission_id.clone());
        let (monitor, registered) = SubmissionMonitor::new(
            crm,
            Arc::clone(&self.gateway),
            self.registry.clone(),
            settings,
            self.options.schedule.clone(),
            state,
        )
        .spawn(self.shutdown.child_token());

        // Dropping this future from here on leaves the tracking task running.
        registered.await.map_err(|_| {
            ArmLinkError::Internal(format!("tracking for submission {submission_id} stopped early"))
        })?;

        Ok(Submission { receipt: SubmissionReceipt { submission_id, sent_xml: document }, monitor })
    }

    async fn load_settings(&self, crm: &dyn CrmClient) -> Result<IntegrationSettings> {
        let rows = fetch_all(crm, &queries::integration_settings(&self.options.settings_name)).await?;
        let row = rows.first().ok_or_else(|| {
            ArmLinkError::Config(format!(
                "integration settings '{}' not found in CRM",
                self.options.settings_name
            ))
        })?;
        IntegrationSettings::from_record(row)
    }
}

/// Fetches every record set `kind` needs, following pagination.
pub async fn fetch_records(
    crm: &dyn CrmClient,
    kind: ReportKind,
    case_id: &CaseId,
) -> Result<ReportRecords> {
    match kind {
        ReportKind::ClientProfile => {
            Ok(ReportRecords::ClientProfile(fetch_all(crm, &queries::client_profiles(case_id)).await?))
        }
        ReportKind::Form9902 => {
            let summary_query =
                queries::form_9902_summary(case_id, &form_9902::summary_source_fields());
            let session_query = queries::group_sessions(case_id);
            let session_attendee_query = queries::group_session_attendees(case_id);
            let attendee_query = queries::attendees(case_id);

            let (summaries, group_sessions, group_session_attendees, attendees) = tokio::try_join!(
                fetch_all(crm, &summary_query),
                fetch_all(crm, &session_query),
                fetch_all(crm, &session_attendee_query),
                fetch_all(crm, &attendee_query),
            )?;

            Ok(ReportRecords::Form9902(Form9902Records {
                summaries,
                group_sessions,
                group_session_attendees,
                attendees,
            }))
        }
    }
}
