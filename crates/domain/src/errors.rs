//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for ArmLink
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ArmLinkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    /// The CRM rejected a query or record update.
    #[error("CRM error: {0}")]
    Crm(String),

    /// The reporting service rejected a submission or status request.
    #[error("Reporting service error: {0}")]
    Reporting(String),

    /// A response body did not carry the element we expected.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ArmLinkError {
    /// Short machine-readable name of the variant, used in logs and API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Auth(_) => "auth",
            Self::Crm(_) => "crm",
            Self::Reporting(_) => "reporting",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Timeout(_) => "timeout",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for ArmLink operations
pub type Result<T> = std::result::Result<T, ArmLinkError>;
