//! HTTP mapping for handler errors.

use armlink_domain::ArmLinkError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

/// Errors returned by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No active session")]
    NoSession,

    #[error("Missing query parameter.")]
    MissingQuery,

    #[error("No login in progress")]
    NoPendingLogin,

    #[error("Missing authorization code")]
    MissingCode,

    #[error("OAuth state mismatch")]
    StateMismatch,

    #[error(transparent)]
    Domain(#[from] ArmLinkError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NoSession => StatusCode::UNAUTHORIZED,
            Self::MissingQuery | Self::NoPendingLogin | Self::MissingCode | Self::StateMismatch => {
                StatusCode::BAD_REQUEST
            }
            Self::Domain(err) => match err {
                ArmLinkError::Auth(_) => StatusCode::UNAUTHORIZED,
                ArmLinkError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                ArmLinkError::NotFound(_) => StatusCode::NOT_FOUND,
                ArmLinkError::Network(_)
                | ArmLinkError::Reporting(_)
                | ArmLinkError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
                ArmLinkError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                ArmLinkError::Crm(_) | ArmLinkError::Config(_) | ArmLinkError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            Self::Domain(err) if status.is_server_error() => {
                error!(kind = err.kind(), error = %err, "Request failed");
            }
            Self::Domain(err) => warn!(kind = err.kind(), error = %err, "Request rejected"),
            _ => {}
        }
        (status, self.to_string()).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
