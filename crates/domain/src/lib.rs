//! # ArmLink Domain
//!
//! Business domain types for ArmLink.
//!
//! This crate contains:
//! - CRM records and their scalar values
//! - Report kinds, case ids and agency reporting settings
//! - Submission tracking types
//! - Configuration structures
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - No dependencies on other ArmLink crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
