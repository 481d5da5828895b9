//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use armlink_core::{
    CrmAuthenticator, CrmConnector, PollSchedule, ReportingGateway, SubmissionOptions,
    SubmissionRegistry, SubmissionService,
};
use armlink_domain::{Config, OAuthSettings, Result};
use armlink_infra::{ArmReportingClient, HttpClient, SalesforceAuthenticator, SalesforceConnector};
use tracing::info;

use crate::session::SessionStore;

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub connector: Arc<dyn CrmConnector>,
    pub authenticator: Arc<dyn CrmAuthenticator>,
    pub submissions: Arc<SubmissionService>,
    pub sessions: SessionStore,
}

impl AppContext {
    /// Wires the Salesforce and ARM adapters over one shared HTTP client.
    pub fn new(config: Config) -> Result<Self> {
        let http = HttpClient::builder().timeout(config.reporting.request_timeout()).build()?;

        let connector = Arc::new(SalesforceConnector::new(http.clone(), config.salesforce.api_version.clone()));
        let authenticator = Arc::new(SalesforceAuthenticator::new(http.clone()));
        let gateway = Arc::new(ArmReportingClient::new(http));

        info!(
            api_version = %config.salesforce.api_version,
            settings_name = %config.reporting.settings_name,
            "Application context initialized"
        );
        Ok(Self::with_ports(config, connector, authenticator, gateway))
    }

    /// Builds the context around caller-supplied port implementations.
    pub fn with_ports(
        config: Config,
        connector: Arc<dyn CrmConnector>,
        authenticator: Arc<dyn CrmAuthenticator>,
        gateway: Arc<dyn ReportingGateway>,
    ) -> Self {
        let options =
            SubmissionOptions::new(&config.reporting, PollSchedule::from(&config.monitor));
        let submissions = SubmissionService::new(gateway, SubmissionRegistry::new(), options);
        let sessions =
            SessionStore::new(Duration::from_secs(config.server.session_idle_minutes.max(1) * 60));

        Self {
            config: Arc::new(config),
            connector,
            authenticator,
            submissions: Arc::new(submissions),
            sessions,
        }
    }

    /// Configured OAuth client, used where a login request gives no override.
    pub fn default_oauth(&self) -> OAuthSettings {
        let sf = &self.config.salesforce;
        OAuthSettings {
            login_url: sf.login_url.clone(),
            client_id: sf.client_id.clone(),
            client_secret: sf.client_secret.clone(),
            callback_url: sf.callback_url.clone(),
        }
    }

    /// Cancels running submission monitors.
    pub fn shutdown(&self) {
        self.submissions.shutdown();
    }
}
