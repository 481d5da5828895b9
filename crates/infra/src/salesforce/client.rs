//! Salesforce REST adapter for the [`CrmClient`] port.

use std::sync::Arc;

use armlink_core::{CrmClient, CrmConnector};
use armlink_domain::{ArmLinkError, CrmSession, QueryPage, Record, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::errors::InfraError;
use crate::http::HttpClient;

/// Page of a SOQL query response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    done: bool,
    #[serde(default)]
    records: Vec<Value>,
    next_records_url: Option<String>,
}

/// Element of the error array Salesforce returns on failed calls.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiFault {
    message: String,
    error_code: Option<String>,
}

/// Authenticated connection to one Salesforce org.
pub struct SalesforceClient {
    http: HttpClient,
    session: CrmSession,
    api_version: String,
}

impl SalesforceClient {
    pub fn new(http: HttpClient, session: CrmSession, api_version: impl Into<String>) -> Self {
        Self { http, session, api_version: api_version.into() }
    }

    fn instance_url(&self) -> &str {
        self.session.instance_url.trim_end_matches('/')
    }

    fn data_url(&self, path: &str) -> String {
        format!("{}/services/data/v{}/{}", self.instance_url(), self.api_version, path)
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        let response = self.http.send(builder.bearer_auth(&self.session.access_token)).await?;
        check_status(response).await
    }

    async fn fetch_page(&self, builder: RequestBuilder) -> Result<QueryPage> {
        let body: QueryResponse =
            self.execute(builder).await?.json().await.map_err(InfraError::from)?;

        let records = body.records.iter().map(Record::from_json).collect::<Result<Vec<_>>>()?;
        debug!(records = records.len(), done = body.done, "Fetched query page");

        Ok(match body.next_records_url.filter(|_| !body.done) {
            Some(cursor) => QueryPage::with_cursor(records, cursor),
            None => QueryPage::last(records),
        })
    }
}

#[async_trait]
impl CrmClient for SalesforceClient {
    #[instrument(skip(self, soql))]
    async fn query(&self, soql: &str) -> Result<QueryPage> {
        let builder = self.http.request(Method::GET, self.data_url("query")).query(&[("q", soql)]);
        self.fetch_page(builder).await
    }

    #[instrument(skip(self))]
    async fn query_more(&self, cursor: &str) -> Result<QueryPage> {
        let url = if cursor.starts_with("http") {
            cursor.to_string()
        } else {
            format!("{}{}", self.instance_url(), cursor)
        };
        self.fetch_page(self.http.request(Method::GET, url)).await
    }

    #[instrument(skip(self, fields), fields(field_count = fields.len()))]
    async fn update_record(&self, object: &str, id: &str, fields: Map<String, Value>) -> Result<()> {
        let url = self.data_url(&format!("sobjects/{object}/{id}"));
        self.execute(self.http.request(Method::PATCH, url).json(&fields)).await?;
        Ok(())
    }

    async fn identity(&self) -> Result<Value> {
        let url = format!("{}/services/oauth2/userinfo", self.instance_url());
        let response = self.execute(self.http.request(Method::GET, url)).await?;
        Ok(response.json().await.map_err(InfraError::from)?)
    }

    async fn revoke(&self) -> Result<()> {
        let url = format!("{}/services/oauth2/revoke", self.instance_url());
        let builder = self
            .http
            .request(Method::POST, url)
            .form(&[("token", self.session.access_token.as_str())]);
        let response = self.http.send(builder).await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Maps a non-success Salesforce response to a domain error, keeping the
/// API's own error codes in the message.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<Vec<ApiFault>>(&body) {
        Ok(faults) if !faults.is_empty() => faults
            .iter()
            .map(|f| match &f.error_code {
                Some(code) => format!("{code}: {}", f.message),
                None => f.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        _ => body,
    };
    let message = format!("HTTP {}: {detail}", status.as_u16());

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ArmLinkError::Auth(message),
        StatusCode::NOT_FOUND => ArmLinkError::NotFound(message),
        _ => ArmLinkError::Crm(message),
    })
}

/// Builds [`SalesforceClient`]s over one shared HTTP connection pool.
#[derive(Clone)]
pub struct SalesforceConnector {
    http: HttpClient,
    api_version: String,
}

impl SalesforceConnector {
    pub fn new(http: HttpClient, api_version: impl Into<String>) -> Self {
        Self { http, api_version: api_version.into() }
    }
}

impl CrmConnector for SalesforceConnector {
    fn connect(&self, session: &CrmSession) -> Arc<dyn CrmClient> {
        Arc::new(SalesforceClient::new(self.http.clone(), session.clone(), self.api_version.clone()))
    }
}
