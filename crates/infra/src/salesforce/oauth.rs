//! Salesforce OAuth 2.0 web-server flow with PKCE.
//!
//! Settings are passed per call; nothing here holds a global client.

use armlink_core::CrmAuthenticator;
use armlink_domain::{ArmLinkError, CrmSession, LoginChallenge, OAuthSettings, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use reqwest::Method;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};
use url::Url;

use crate::errors::InfraError;
use crate::http::HttpClient;

const SCOPE: &str = "full";

fn random_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Fresh PKCE verifier, its S256 challenge, and a CSRF state token.
pub fn generate_challenge() -> LoginChallenge {
    let code_verifier = random_token();
    let code_challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(code_verifier.as_bytes()));
    LoginChallenge { code_verifier, code_challenge, state: random_token() }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    instance_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenFault {
    error: String,
    #[serde(default)]
    error_description: String,
}

fn endpoint(login_url: &str, path: &str) -> Result<Url> {
    let base = Url::parse(login_url.trim_end_matches('/')).map_err(InfraError::from)?;
    Ok(base.join(path).map_err(InfraError::from)?)
}

pub struct SalesforceAuthenticator {
    http: HttpClient,
}

impl SalesforceAuthenticator {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl CrmAuthenticator for SalesforceAuthenticator {
    fn authorization_url(&self, settings: &OAuthSettings, challenge: &LoginChallenge) -> Result<String> {
        let mut url = endpoint(&settings.login_url, "/services/oauth2/authorize")?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &settings.client_id)
            .append_pair("redirect_uri", &settings.callback_url)
            .append_pair("scope", SCOPE)
            .append_pair("state", &challenge.state)
            .append_pair("code_challenge", &challenge.code_challenge)
            .append_pair("code_challenge_method", challenge.challenge_method());
        Ok(url.into())
    }

    #[instrument(skip_all, fields(login_url = %settings.login_url))]
    async fn exchange_code(
        &self,
        settings: &OAuthSettings,
        code: &str,
        code_verifier: &str,
    ) -> Result<CrmSession> {
        let url = endpoint(&settings.login_url, "/services/oauth2/token")?;
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", settings.client_id.as_str()),
            ("client_secret", settings.client_secret.as_str()),
            ("redirect_uri", settings.callback_url.as_str()),
            ("code_verifier", code_verifier),
        ];

        let response = self.http.send_once(self.http.request(Method::POST, url).form(&form)).await?;
        let status = response.status();
        let body = response.text().await.map_err(InfraError::from)?;

        if !status.is_success() {
            let detail = serde_json::from_str::<TokenFault>(&body)
                .map(|f| format!("{}: {}", f.error, f.error_description))
                .unwrap_or(body);
            warn!(status = status.as_u16(), detail = %detail, "Token exchange rejected");
            return Err(ArmLinkError::Auth(format!("token exchange failed: {detail}")));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(InfraError::from)?;
        info!(instance_url = %token.instance_url, "Salesforce login completed");
        Ok(CrmSession { instance_url: token.instance_url, access_token: token.access_token })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings() -> OAuthSettings {
        OAuthSettings {
            login_url: "https://login.salesforce.com/".into(),
            client_id: "3MVG9 client".into(),
            client_secret: "secret".into(),
            callback_url: "http://localhost:8080/auth/callback".into(),
        }
    }

    #[test]
    fn challenge_is_sha256_of_verifier() {
        let challenge = generate_challenge();
        assert_eq!(challenge.code_verifier.len(), 43);
        let expected = URL_SAFE_NO_PAD.encode(Sha256::digest(challenge.code_verifier.as_bytes()));
        assert_eq!(challenge.code_challenge, expected);
        assert_ne!(challenge.state, generate_challenge().state);
    }

    #[test]
    fn authorization_url_carries_pkce_and_state() {
        let auth = SalesforceAuthenticator::new(HttpClient::new().unwrap());
        let challenge = generate_challenge();

        let url = Url::parse(&auth.authorization_url(&settings(), &challenge).unwrap()).unwrap();
        assert_eq!(url.path(), "/services/oauth2/authorize");

        let params: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "3MVG9 client");
        assert_eq!(params["scope"], "full");
        assert_eq!(params["state"], challenge.state);
        assert_eq!(params["code_challenge"], challenge.code_challenge);
        assert_eq!(params["code_challenge_method"], "S256");
        assert_eq!(params["redirect_uri"], "http://localhost:8080/auth/callback");
    }

    #[test]
    fn unparseable_login_url_is_a_config_error() {
        let auth = SalesforceAuthenticator::new(HttpClient::new().unwrap());
        let mut bad = settings();
        bad.login_url = "login.salesforce.com".into();

        let err = auth.authorization_url(&bad, &generate_challenge()).unwrap_err();
        assert!(matches!(err, ArmLinkError::Config(_)));
    }
}
