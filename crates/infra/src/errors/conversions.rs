//! Conversions from external infrastructure errors into domain errors.

use armlink_domain::ArmLinkError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use url::ParseError as UrlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ArmLinkError);

impl From<InfraError> for ArmLinkError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ArmLinkError> for InfraError {
    fn from(value: ArmLinkError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoArmLinkError {
    fn into_armlink(self) -> ArmLinkError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ArmLinkError */
/* -------------------------------------------------------------------------- */

impl IntoArmLinkError for HttpError {
    fn into_armlink(self) -> ArmLinkError {
        if self.is_timeout() {
            return ArmLinkError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return ArmLinkError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return ArmLinkError::MalformedResponse(format!("undecodable HTTP body: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => ArmLinkError::Auth(message),
                404 => ArmLinkError::NotFound(message),
                429 => ArmLinkError::Network(message),
                400..=499 => ArmLinkError::InvalidInput(message),
                _ => ArmLinkError::Network(message),
            };
        }

        ArmLinkError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_armlink())
    }
}

/* -------------------------------------------------------------------------- */
/* url::ParseError → ArmLinkError */
/* -------------------------------------------------------------------------- */

impl IntoArmLinkError for UrlError {
    fn into_armlink(self) -> ArmLinkError {
        ArmLinkError::Config(format!("invalid URL: {self}"))
    }
}

impl From<UrlError> for InfraError {
    fn from(value: UrlError) -> Self {
        InfraError(value.into_armlink())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → ArmLinkError */
/* -------------------------------------------------------------------------- */

impl IntoArmLinkError for JsonError {
    fn into_armlink(self) -> ArmLinkError {
        ArmLinkError::MalformedResponse(format!("invalid JSON payload: {self}"))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_armlink())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
