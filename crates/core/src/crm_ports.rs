//! CRM port interfaces

use std::sync::Arc;

use async_trait::async_trait;
use armlink_domain::{CrmSession, LoginChallenge, OAuthSettings, QueryPage, Result};
use serde_json::{Map, Value};

/// Trait for an authenticated CRM connection
#[async_trait]
pub trait CrmClient: Send + Sync {
    /// Run a query and return its first page
    async fn query(&self, soql: &str) -> Result<QueryPage>;

    /// Fetch the page behind a continuation cursor
    async fn query_more(&self, cursor: &str) -> Result<QueryPage>;

    /// Update fields on an existing record
    async fn update_record(&self, object: &str, id: &str, fields: Map<String, Value>) -> Result<()>;

    /// Identity of the authenticated user
    async fn identity(&self) -> Result<Value>;

    /// Revoke the session's access token
    async fn revoke(&self) -> Result<()>;
}

/// Builds a CRM connection from session-stored credentials.
///
/// Connections are not pooled; each request reconstructs one.
pub trait CrmConnector: Send + Sync {
    fn connect(&self, session: &CrmSession) -> Arc<dyn CrmClient>;
}

/// Trait for the CRM's OAuth authorization-code flow
#[async_trait]
pub trait CrmAuthenticator: Send + Sync {
    /// Authorization URL the browser is redirected to
    fn authorization_url(&self, settings: &OAuthSettings, challenge: &LoginChallenge)
        -> Result<String>;

    /// Exchange an authorization code for a CRM session
    async fn exchange_code(
        &self,
        settings: &OAuthSettings,
        code: &str,
        code_verifier: &str,
    ) -> Result<CrmSession>;
}
