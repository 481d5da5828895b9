//! Reporting service port interfaces

use async_trait::async_trait;
use armlink_domain::{IntegrationSettings, Result};

/// Trait for the HUD ARM SOAP transport
#[async_trait]
pub trait ReportingGateway: Send + Sync {
    /// POST a SOAP envelope to the settings' endpoint and return the raw
    /// response body. Non-success statuses are errors.
    async fn post_envelope(&self, settings: &IntegrationSettings, envelope: String)
        -> Result<String>;
}
