//! Configuration structures

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_FISCAL_YEAR_ID, DEFAULT_MAX_POLL_ATTEMPTS,
    DEFAULT_MAX_POLL_INTERVAL_SECS, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_SETTINGS_NAME,
};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub salesforce: SalesforceConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Mark the session cookie `Secure` (enable behind TLS).
    pub secure_cookies: bool,
    pub session_idle_minutes: u64,
    /// Where the browser lands after login and logout.
    pub post_login_redirect: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            secure_cookies: false,
            session_idle_minutes: 120,
            post_login_redirect: "/index.html".to_string(),
        }
    }
}

/// Default OAuth client used when a login request does not supply its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesforceConfig {
    pub login_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_api_version() -> String {
    "59.0".to_string()
}

/// Reporting service settings that are not stored in the CRM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingConfig {
    /// `Name` of the `IntegrationSettings__c` row holding agency credentials.
    pub settings_name: String,
    pub fiscal_year_id: String,
    pub request_timeout_secs: u64,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            settings_name: DEFAULT_SETTINGS_NAME.to_string(),
            fiscal_year_id: DEFAULT_FISCAL_YEAR_ID.to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl ReportingConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Status polling schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub poll_interval_secs: u64,
    pub max_poll_interval_secs: u64,
    pub max_poll_attempts: u32,
    pub backoff_multiplier: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            max_poll_interval_secs: DEFAULT_MAX_POLL_INTERVAL_SECS,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}
