//! # ArmLink Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - Configuration loading (environment and files)
//! - The shared retrying HTTP client
//! - Salesforce REST and OAuth adapters
//! - The HUD ARM SOAP transport
//!
//! ## Architecture
//! - Implements traits defined in `armlink-core`
//! - Contains all "impure" code (network and filesystem I/O)

pub mod config;
pub mod errors;
pub mod http;
pub mod reporting;
pub mod salesforce;

// Re-export commonly used items
pub use http::*;
pub use reporting::ArmReportingClient;
pub use salesforce::{generate_challenge, SalesforceAuthenticator, SalesforceClient, SalesforceConnector};
