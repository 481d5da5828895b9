//! Application constants
//!
//! Centralized location for the wire-level names the CRM and the HUD ARM
//! service expect. Spelling and case are part of the external contract.

// CRM objects
pub const CASE_OBJECT: &str = "X9902__c";
pub const SETTINGS_OBJECT: &str = "IntegrationSettings__c";
pub const DEFAULT_SETTINGS_NAME: &str = "HUD Settings";

// Write-back fields on the case record
pub const CLIENT_SUBMISSION_ID_FIELD: &str = "ClientSubmissionID__c";
pub const CLIENT_SUBMISSION_STATUS_FIELD: &str = "ClientSubmissionStatus__c";
pub const SUMMARY_SUBMISSION_ID_FIELD: &str = "Summary9902SubmissionID__c";
pub const SUMMARY_SUBMISSION_STATUS_FIELD: &str = "Summary9902SubmissionStatus__c";

// HUD ARM schema namespaces
pub const CLIENT_PROFILE_NAMESPACE: &str = "http://gov.hud.arm/client_profile_databag_6_0";
pub const CLIENT_PROFILE_SCHEMA: &str = "client_profile_databag_6_0.xsd";
pub const FORM_9902_NAMESPACE: &str = "http://gov.hud.arm/form_9902_databag_6_0";
pub const FORM_9902_SCHEMA: &str = "form_9902_databag_6_0.xsd";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

// SOAP
pub const SOAP_ENV_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const ARM_SERVICE_NAMESPACE: &str = "http://service.arm.hud.gov/";
pub const DEFAULT_FISCAL_YEAR_ID: &str = "28";
pub const SUBMISSION_DATA_ENCODING: &str = "TEXT/XML";

// Status markers reported by the reporting service
pub const STATUS_DONE: &str = "DONE";
pub const STATUS_ERROR_MARKER: &str = "ERROR";
pub const STATUS_TIMEOUT: &str = "TIMEOUT";

// Poll defaults
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_MAX_POLL_INTERVAL_SECS: u64 = 900;
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 48;
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;
