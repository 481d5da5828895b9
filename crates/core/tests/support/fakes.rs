use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use armlink_core::{CrmClient, ReportingGateway};
use armlink_domain::{ArmLinkError, IntegrationSettings, QueryPage, Record, Result};
use serde_json::{Map, Value};

/// Captured `update_record` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub object: String,
    pub id: String,
    pub fields: Map<String, Value>,
}

/// In-memory CRM answering queries by the object / element type they name.
#[derive(Default, Clone)]
pub struct FakeCrm {
    tables: Arc<Mutex<Vec<(String, Vec<Record>)>>>,
    queries: Arc<Mutex<Vec<String>>>,
    updates: Arc<Mutex<Vec<Update>>>,
    fail_queries_matching: Arc<Mutex<Option<String>>>,
    fail_updates: Arc<Mutex<bool>>,
    update_delay: Arc<Mutex<Duration>>,
}

impl FakeCrm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows returned for any query containing `marker`.
    pub fn with_rows(self, marker: &str, rows: Vec<Record>) -> Self {
        self.tables.lock().unwrap().push((marker.to_string(), rows));
        self
    }

    pub fn failing_query(self, marker: &str) -> Self {
        *self.fail_queries_matching.lock().unwrap() = Some(marker.to_string());
        self
    }

    pub fn failing_updates(self) -> Self {
        *self.fail_updates.lock().unwrap() = true;
        self
    }

    /// Every `update_record` call waits `delay` before it lands.
    pub fn slow_updates(self, delay: Duration) -> Self {
        *self.update_delay.lock().unwrap() = delay;
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<Update> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl CrmClient for FakeCrm {
    async fn query(&self, soql: &str) -> Result<QueryPage> {
        self.queries.lock().unwrap().push(soql.to_string());

        if let Some(marker) = self.fail_queries_matching.lock().unwrap().as_ref() {
            if soql.contains(marker.as_str()) {
                return Err(ArmLinkError::Crm("INVALID_FIELD: no such column".into()));
            }
        }

        let rows = self
            .tables
            .lock()
            .unwrap()
            .iter()
            .find(|(marker, _)| soql.contains(marker.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default();
        Ok(QueryPage::last(rows))
    }

    async fn query_more(&self, cursor: &str) -> Result<QueryPage> {
        Err(ArmLinkError::Crm(format!("unexpected cursor {cursor}")))
    }

    async fn update_record(&self, object: &str, id: &str, fields: Map<String, Value>) -> Result<()> {
        let delay = *self.update_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.updates.lock().unwrap().push(Update {
            object: object.to_string(),
            id: id.to_string(),
            fields,
        });
        if *self.fail_updates.lock().unwrap() {
            return Err(ArmLinkError::Crm("ENTITY_IS_LOCKED".into()));
        }
        Ok(())
    }

    async fn identity(&self) -> Result<Value> {
        Ok(serde_json::json!({ "preferred_username": "caseworker@example.org" }))
    }

    async fn revoke(&self) -> Result<()> {
        Ok(())
    }
}

/// Gateway replaying a fixed script of responses, one per POST.
#[derive(Default, Clone)]
pub struct ScriptedGateway {
    script: Arc<Mutex<VecDeque<Result<String>>>>,
    posted: Arc<Mutex<Vec<String>>>,
}

impl ScriptedGateway {
    pub fn new(script: impl IntoIterator<Item = Result<String>>) -> Self {
        Self { script: Arc::new(Mutex::new(script.into_iter().collect())), ..Self::default() }
    }

    pub fn posted(&self) -> Vec<String> {
        self.posted.lock().unwrap().clone()
    }

    /// Status polls seen so far (submission POST excluded).
    pub fn status_polls(&self) -> usize {
        self.posted().iter().filter(|body| body.contains("getSubmissionInfo")).count()
    }
}

#[async_trait]
impl ReportingGateway for ScriptedGateway {
    async fn post_envelope(&self, _settings: &IntegrationSettings, envelope: String) -> Result<String> {
        self.posted.lock().unwrap().push(envelope);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ArmLinkError::Network("script exhausted".into())))
    }
}
