//! Salesforce adapters: REST data access and OAuth login.

pub mod client;
pub mod oauth;

pub use client::{SalesforceClient, SalesforceConnector};
pub use oauth::{generate_challenge, SalesforceAuthenticator};
