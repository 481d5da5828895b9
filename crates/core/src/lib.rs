//! # ArmLink Core
//!
//! Business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces for the CRM and the HUD ARM reporting service
//! - Paginated record fetching
//! - The declarative field-map transform to HUD ARM XML
//! - SOAP envelope construction and response parsing
//! - The submission service and its status poll monitor
//!
//! ## Architecture Principles
//! - Only depends on `armlink-domain`
//! - No HTTP or platform code
//! - All external dependencies via traits

pub mod fetch;
pub mod report;
pub mod soap;
pub mod submission;

// Ports
pub mod crm_ports;
pub mod reporting_ports;

pub use crm_ports::{CrmAuthenticator, CrmClient, CrmConnector};
pub use fetch::fetch_all;
pub use report::{Form9902Records, ReportRecords};
pub use reporting_ports::ReportingGateway;
pub use submission::{
    PollSchedule, Submission, SubmissionMonitor, SubmissionOptions, SubmissionRegistry,
    SubmissionService,
};
