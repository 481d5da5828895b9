use armlink_core::ReportingGateway;
use armlink_domain::{ArmLinkError, IntegrationSettings, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT_LANGUAGE, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::Method;
use tracing::{debug, instrument, warn};

use crate::errors::InfraError;
use crate::http::HttpClient;

/// Posts SOAP envelopes to the agency's ARM endpoint with HTTP Basic auth.
///
/// Every call is a single attempt. Submissions must not be repeated, and
/// status polls are already retried by the submission monitor.
#[derive(Clone)]
pub struct ArmReportingClient {
    http: HttpClient,
}

impl ArmReportingClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ReportingGateway for ArmReportingClient {
    #[instrument(skip_all, fields(endpoint = %settings.endpoint_url, bytes = envelope.len()))]
    async fn post_envelope(&self, settings: &IntegrationSettings, envelope: String) -> Result<String> {
        let request = self
            .http
            .request(Method::POST, settings.endpoint_url.as_str())
            .basic_auth(&settings.username, Some(&settings.password))
            .header(CONTENT_TYPE, "text/xml; charset=UTF-8")
            .header(CACHE_CONTROL, "no-cache")
            .header(ACCEPT_LANGUAGE, "en-us")
            .body(envelope);

        let response = self.http.send_once(request).await?;
        let status = response.status();
        let body = response.text().await.map_err(InfraError::from)?;
        debug!(status = status.as_u16(), "ARM response received");

        if !status.is_success() {
            warn!(status = status.as_u16(), "ARM endpoint rejected request");
            return Err(ArmLinkError::Reporting(format!("HTTP {}: {body}", status.as_u16())));
        }
        Ok(body)
    }
}
