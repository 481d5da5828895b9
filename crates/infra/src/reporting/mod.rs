//! HUD ARM SOAP transport.

pub mod client;

pub use client::ArmReportingClient;
