//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store/engine/directory wiring
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: Arc<services::AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(services))
}
