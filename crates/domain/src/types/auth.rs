//! OAuth and CRM session types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-login OAuth client settings.
///
/// Built for each login attempt from the request and the configured
/// defaults, then kept with that browser session only.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthSettings {
    pub login_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

impl fmt::Debug for OAuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthSettings")
            .field("login_url", &self.login_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("callback_url", &self.callback_url)
            .finish()
    }
}

/// PKCE verifier and CSRF state generated for an authorization redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginChallenge {
    pub code_verifier: String,
    pub code_challenge: String,
    pub state: String,
}

impl LoginChallenge {
    pub fn challenge_method(&self) -> &'static str {
        "S256"
    }
}

/// Authenticated CRM connection handle stored in the server-side session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmSession {
    pub instance_url: String,
    pub access_token: String,
}

impl fmt::Debug for CrmSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrmSession")
            .field("instance_url", &self.instance_url)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
