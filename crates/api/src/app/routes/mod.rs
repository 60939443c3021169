use axum::Router;

pub mod admin;
pub mod system;

/// Router for all application endpoints except health.
pub fn router() -> Router {
    Router::new().nest("/admin", admin::router())
}
