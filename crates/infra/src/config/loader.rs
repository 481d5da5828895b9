//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the required Salesforce variables are missing, falls back to a file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! Required:
//! - `ARMLINK_SF_LOGIN_URL`: Salesforce login host (e.g. `https://login.salesforce.com`)
//! - `ARMLINK_SF_CLIENT_ID`: connected app consumer key
//! - `ARMLINK_SF_CLIENT_SECRET`: connected app consumer secret
//! - `ARMLINK_SF_CALLBACK_URL`: OAuth redirect URI
//!
//! Optional:
//! - `ARMLINK_SF_API_VERSION`: REST API version (default `59.0`)
//! - `ARMLINK_BIND_ADDR`: listen address; `PORT` alone binds `0.0.0.0:$PORT`
//! - `ARMLINK_SECURE_COOKIES`: mark the session cookie `Secure` (true/false)
//! - `ARMLINK_SESSION_IDLE_MINUTES`: session idle expiry
//! - `ARMLINK_POST_LOGIN_REDIRECT`: page shown after login and logout
//! - `ARMLINK_SETTINGS_NAME`: `IntegrationSettings__c` row name
//! - `ARMLINK_FISCAL_YEAR_ID`: HUD fiscal year id sent in submissions
//! - `ARMLINK_HTTP_TIMEOUT_SECS`: per-request timeout for outbound HTTP
//! - `ARMLINK_POLL_INTERVAL_SECS`: first status poll delay
//! - `ARMLINK_MAX_POLL_INTERVAL_SECS`: backoff cap
//! - `ARMLINK_MAX_POLL_ATTEMPTS`: polls before a submission times out
//! - `ARMLINK_BACKOFF_MULTIPLIER`: delay growth factor per poll
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./armlink.json` or `./armlink.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use armlink_domain::{
    ArmLinkError, Config, MonitorConfig, ReportingConfig, Result, SalesforceConfig, ServerConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `ArmLinkError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The four Salesforce connection variables must be present; everything
/// else falls back to its default.
///
/// # Errors
/// Returns `ArmLinkError::Config` if required variables are missing
/// or any variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let salesforce = SalesforceConfig {
        login_url: env_var("ARMLINK_SF_LOGIN_URL")?,
        client_id: env_var("ARMLINK_SF_CLIENT_ID")?,
        client_secret: env_var("ARMLINK_SF_CLIENT_SECRET")?,
        callback_url: env_var("ARMLINK_SF_CALLBACK_URL")?,
        api_version: std::env::var("ARMLINK_SF_API_VERSION").unwrap_or_else(|_| "59.0".to_string()),
    };

    let server_defaults = ServerConfig::default();
    let bind_addr = match (std::env::var("ARMLINK_BIND_ADDR"), std::env::var("PORT")) {
        (Ok(addr), _) => addr,
        (Err(_), Ok(port)) => {
            let port: u16 = parse_value("PORT", &port)?;
            format!("0.0.0.0:{port}")
        }
        _ => server_defaults.bind_addr,
    };
    let server = ServerConfig {
        bind_addr,
        secure_cookies: env_bool("ARMLINK_SECURE_COOKIES", server_defaults.secure_cookies),
        session_idle_minutes: env_parse(
            "ARMLINK_SESSION_IDLE_MINUTES",
            server_defaults.session_idle_minutes,
        )?,
        post_login_redirect: std::env::var("ARMLINK_POST_LOGIN_REDIRECT")
            .unwrap_or(server_defaults.post_login_redirect),
    };

    let reporting_defaults = ReportingConfig::default();
    let reporting = ReportingConfig {
        settings_name: std::env::var("ARMLINK_SETTINGS_NAME")
            .unwrap_or(reporting_defaults.settings_name),
        fiscal_year_id: std::env::var("ARMLINK_FISCAL_YEAR_ID")
            .unwrap_or(reporting_defaults.fiscal_year_id),
        request_timeout_secs: env_parse(
            "ARMLINK_HTTP_TIMEOUT_SECS",
            reporting_defaults.request_timeout_secs,
        )?,
    };

    let monitor_defaults = MonitorConfig::default();
    let monitor = MonitorConfig {
        poll_interval_secs: env_parse(
            "ARMLINK_POLL_INTERVAL_SECS",
            monitor_defaults.poll_interval_secs,
        )?,
        max_poll_interval_secs: env_parse(
            "ARMLINK_MAX_POLL_INTERVAL_SECS",
            monitor_defaults.max_poll_interval_secs,
        )?,
        max_poll_attempts: env_parse(
            "ARMLINK_MAX_POLL_ATTEMPTS",
            monitor_defaults.max_poll_attempts,
        )?,
        backoff_multiplier: env_parse(
            "ARMLINK_BACKOFF_MULTIPLIER",
            monitor_defaults.backoff_multiplier,
        )?,
    };

    Ok(Config { server, salesforce, reporting, monitor })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ArmLinkError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ArmLinkError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ArmLinkError::Config(
                "No config file found and ARMLINK_SF_* environment variables are not set"
                    .to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ArmLinkError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ArmLinkError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ArmLinkError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ArmLinkError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();
    let names = ["config.json", "config.toml", "armlink.json", "armlink.toml"];

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(names.iter().map(|name| cwd.join(name)));
        candidates.push(cwd.join("../config.json"));
        candidates.push(cwd.join("../config.toml"));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(names.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
///
/// Empty values count as missing.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty()).ok_or_else(|| {
        ArmLinkError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional environment variable, using `default` when unset.
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ArmLinkError::Config(format!("Invalid value for {key}: {e}")))
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
