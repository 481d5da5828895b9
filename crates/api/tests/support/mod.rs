//! Port fakes and request helpers for router tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use armlink_api::AppContext;
use armlink_core::{CrmAuthenticator, CrmClient, CrmConnector, ReportingGateway};
use armlink_domain::{
    ArmLinkError, Config, CrmSession, IntegrationSettings, LoginChallenge, OAuthSettings, QueryPage,
    Record, Result, SalesforceConfig,
};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use serde_json::{json, Map, Value};

pub const CASE_ID: &str = "a0B5e000001AbCdEAK";
pub const GOOD_CODE: &str = "good-code";

// ============================================================================
// CRM
// ============================================================================

#[derive(Clone, Default)]
pub struct FakeCrm {
    revoked: Arc<Mutex<usize>>,
    updates: Arc<Mutex<Vec<(String, Map<String, Value>)>>>,
}

impl FakeCrm {
    pub fn revocations(&self) -> usize {
        *self.revoked.lock().unwrap()
    }

    pub fn updates(&self) -> Vec<(String, Map<String, Value>)> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl CrmClient for FakeCrm {
    async fn query(&self, soql: &str) -> Result<QueryPage> {
        let rows = if soql.contains("IntegrationSettings__c") {
            vec![Record::new()
                .with("EndpointURL__c", "https://arm.example.gov/ArmService")
                .with("AgencyId__c", "80123")
                .with("Username__c", "agency")
                .with("Password__c", "secret")]
        } else if soql.contains("X9902_Client__c") {
            vec![Record::new().with("Client_ID_Num__c", "C-1")]
        } else {
            Vec::new()
        };
        Ok(QueryPage::last(rows))
    }

    async fn query_more(&self, cursor: &str) -> Result<QueryPage> {
        Err(ArmLinkError::Crm(format!("unexpected cursor {cursor}")))
    }

    async fn update_record(&self, _object: &str, id: &str, fields: Map<String, Value>) -> Result<()> {
        self.updates.lock().unwrap().push((id.to_string(), fields));
        Ok(())
    }

    async fn identity(&self) -> Result<Value> {
        Ok(json!({ "preferred_username": "counselor@example.org" }))
    }

    async fn revoke(&self) -> Result<()> {
        *self.revoked.lock().unwrap() += 1;
        Ok(())
    }
}

pub struct FakeConnector(pub FakeCrm);

impl CrmConnector for FakeConnector {
    fn connect(&self, _session: &CrmSession) -> Arc<dyn CrmClient> {
        Arc::new(self.0.clone())
    }
}

pub struct FakeAuthenticator;

#[async_trait]
impl CrmAuthenticator for FakeAuthenticator {
    fn authorization_url(&self, settings: &OAuthSettings, challenge: &LoginChallenge) -> Result<String> {
        Ok(format!(
            "{}/services/oauth2/authorize?client_id={}&state={}",
            settings.login_url, settings.client_id, challenge.state
        ))
    }

    async fn exchange_code(
        &self,
        _settings: &OAuthSettings,
        code: &str,
        _code_verifier: &str,
    ) -> Result<CrmSession> {
        if code != GOOD_CODE {
            return Err(ArmLinkError::Auth("invalid_grant".into()));
        }
        Ok(CrmSession {
            instance_url: "https://acme.my.salesforce.com".into(),
            access_token: "00D-token".into(),
        })
    }
}

// ============================================================================
// Reporting
// ============================================================================

#[derive(Clone, Default)]
pub struct ScriptedGateway {
    script: Arc<Mutex<VecDeque<Result<String>>>>,
}

impl ScriptedGateway {
    pub fn new(script: impl IntoIterator<Item = Result<String>>) -> Self {
        Self { script: Arc::new(Mutex::new(script.into_iter().collect())) }
    }
}

#[async_trait]
impl ReportingGateway for ScriptedGateway {
    async fn post_envelope(&self, _settings: &IntegrationSettings, _envelope: String) -> Result<String> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ArmLinkError::Network("script exhausted".into())))
    }
}

pub fn submit_response(id: &str) -> String {
    format!("<S:Envelope><S:Body><return><submissionId>{id}</submissionId></return></S:Body></S:Envelope>")
}

// ============================================================================
// Context and requests
// ============================================================================

pub fn config() -> Config {
    Config {
        server: Default::default(),
        salesforce: SalesforceConfig {
            login_url: "https://login.salesforce.com".into(),
            client_id: "default-client".into(),
            client_secret: "default-secret".into(),
            callback_url: "http://localhost:8080/auth/callback".into(),
            api_version: "59.0".into(),
        },
        reporting: Default::default(),
        monitor: Default::default(),
    }
}

pub fn context(crm: FakeCrm, gateway: ScriptedGateway) -> AppContext {
    AppContext::with_ports(
        config(),
        Arc::new(FakeConnector(crm)),
        Arc::new(FakeAuthenticator),
        Arc::new(gateway),
    )
}

/// Seeds a logged-in session and returns its cookie header value.
pub fn signed_in(ctx: &AppContext) -> String {
    let id = ctx.sessions.create(armlink_api::session::SessionData {
        crm: Some(CrmSession {
            instance_url: "https://acme.my.salesforce.com".into(),
            access_token: "00D-token".into(),
        }),
        ..Default::default()
    });
    format!("armlink_sid={id}")
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn header<'a>(response: &'a Response<Body>, name: &str) -> &'a str {
    response.headers().get(name).unwrap().to_str().unwrap()
}
