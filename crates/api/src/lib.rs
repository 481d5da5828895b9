//! # ArmLink API
//!
//! HTTP application layer - routes, sessions, and the server entry point.
//!
//! This crate contains:
//! - Route handlers (browser → CRM and reporting workflows)
//! - Application context (dependency injection)
//! - Server-side session handling
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod context;
pub mod error;
pub mod routes;
pub mod session;
pub mod utils;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use context::AppContext;
pub use error::{ApiError, ApiResult};

/// Full route table.
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/auth/login", get(routes::auth::login))
        .route("/auth/callback", get(routes::auth::callback))
        .route("/auth/logout", get(routes::auth::logout))
        .route("/auth/whoami", get(routes::auth::whoami))
        .route("/query", get(routes::report::submit_client_profile))
        .route("/query-summary", get(routes::report::submit_form_9902))
        .route("/submissions/{id}", get(routes::report::submission_status))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
