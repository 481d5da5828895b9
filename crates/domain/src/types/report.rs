//! Report kinds, case identifiers and the agency's reporting settings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CLIENT_SUBMISSION_ID_FIELD, CLIENT_SUBMISSION_STATUS_FIELD, SUMMARY_SUBMISSION_ID_FIELD,
    SUMMARY_SUBMISSION_STATUS_FIELD,
};
use crate::errors::{ArmLinkError, Result};
use crate::types::record::Record;

/// Which HUD ARM submission a case is being reported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Per-client profiles (`client_profile_databag_6_0`).
    ClientProfile,
    /// Aggregate Form 9902 with group sessions and attendees.
    Form9902,
}

impl ReportKind {
    /// SOAP operation the envelope body is wrapped in.
    pub fn operation(self) -> &'static str {
        match self {
            Self::ClientProfile => "postClientData",
            Self::Form9902 => "postForm9902Data",
        }
    }

    /// Case field that receives the submission id.
    pub fn submission_id_field(self) -> &'static str {
        match self {
            Self::ClientProfile => CLIENT_SUBMISSION_ID_FIELD,
            Self::Form9902 => SUMMARY_SUBMISSION_ID_FIELD,
        }
    }

    /// Case field that receives the terminal status.
    pub fn submission_status_field(self) -> &'static str {
        match self {
            Self::ClientProfile => CLIENT_SUBMISSION_STATUS_FIELD,
            Self::Form9902 => SUMMARY_SUBMISSION_STATUS_FIELD,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientProfile => f.write_str("client_profile"),
            Self::Form9902 => f.write_str("form_9902"),
        }
    }
}

/// Validated CRM record id of the case being reported.
///
/// The id is interpolated into query text, so only the 15 or 18 character
/// alphanumeric forms the CRM issues are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CaseId(String);

impl CaseId {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let valid_len = matches!(trimmed.len(), 15 | 18);
        if !valid_len || !trimmed.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(ArmLinkError::InvalidInput(format!("'{raw}' is not a valid record id")));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CaseId {
    type Error = ArmLinkError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CaseId> for String {
    fn from(value: CaseId) -> Self {
        value.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Agency credentials and endpoint for the reporting service, stored in the
/// CRM as a custom setting.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationSettings {
    pub endpoint_url: String,
    pub agency_id: String,
    pub agency_name: String,
    pub username: String,
    pub password: String,
    pub cms_password: String,
    pub vendor_id: String,
}

impl IntegrationSettings {
    /// Reads the settings row returned by the CRM.
    pub fn from_record(record: &Record) -> Result<Self> {
        let required = |field: &str| {
            record
                .text(field)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ArmLinkError::Config(format!("integration setting {field} is empty")))
        };

        Ok(Self {
            endpoint_url: required("EndpointURL__c")?,
            agency_id: required("AgencyId__c")?,
            agency_name: record.text("AgencyName__c").unwrap_or_default(),
            username: required("Username__c")?,
            password: required("Password__c")?,
            cms_password: record.text("CMSPassword__c").unwrap_or_default(),
            vendor_id: record.text("VendorId__c").unwrap_or_default(),
        })
    }
}

impl fmt::Debug for IntegrationSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrationSettings")
            .field("endpoint_url", &self.endpoint_url)
            .field("agency_id", &self.agency_id)
            .field("agency_name", &self.agency_name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("cms_password", &"<redacted>")
            .field("vendor_id", &self.vendor_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_id_accepts_crm_id_lengths() {
        assert!(CaseId::parse("a0B5e000001AbCd").is_ok());
        assert!(CaseId::parse("a0B5e000001AbCdEAK").is_ok());
        assert!(CaseId::parse(" a0B5e000001AbCdEAK ").is_ok());
    }

    #[test]
    fn case_id_rejects_query_injection() {
        assert!(CaseId::parse("a0B5e000001AbCd' OR Name != '").is_err());
        assert!(CaseId::parse("").is_err());
        assert!(CaseId::parse("a0B5e000001AbC-").is_err());
    }

    #[test]
    fn settings_read_case_insensitive_columns() {
        let record = Record::new()
            .with("EndpointURL__c", "https://arm.example.gov/service")
            .with("AgencyId__c", "80123")
            .with("AgencyName__c", "Housing Partners")
            .with("Username__c", "agency")
            .with("Password__c", "secret")
            .with("CMSPassword__c", "cms")
            .with("VendorId__c", "17");

        let settings = IntegrationSettings::from_record(&record).unwrap();
        assert_eq!(settings.agency_id, "80123");
        assert_eq!(settings.vendor_id, "17");
        assert!(!format!("{settings:?}").contains("secret"));
    }

    #[test]
    fn settings_require_endpoint() {
        let record = Record::new().with("AgencyId__c", "1");
        let err = IntegrationSettings::from_record(&record).unwrap_err();
        assert!(matches!(err, ArmLinkError::Config(_)));
    }

    #[test]
    fn report_kind_selects_write_back_fields() {
        assert_eq!(ReportKind::ClientProfile.submission_id_field(), "ClientSubmissionID__c");
        assert_eq!(ReportKind::Form9902.submission_status_field(), "Summary9902SubmissionStatus__c");
        assert_eq!(ReportKind::Form9902.operation(), "postForm9902Data");
    }
}
