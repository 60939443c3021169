//! Admin routes for user management.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use flatshare_core::UserId;

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user).delete(remove_user))
        .route("/users/:id/dependents", get(dependents))
}

/// GET /admin/users - List cached users
pub async fn list_users(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    Json(dto::UserList {
        items: services.users_list(),
    })
    .into_response()
}

/// GET /admin/users/:id - Get a cached user
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let user_id: UserId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::invalid_id(e),
    };

    match services.users_get(&user_id) {
        Some(user) => (StatusCode::OK, Json(user)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
    }
}

/// GET /admin/users/:id/dependents - What a removal would delete right now
pub async fn dependents(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let user_id: UserId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::invalid_id(e),
    };

    match services.dependents(&user_id).await {
        Ok(set) => Json(dto::Dependents::from(set)).into_response(),
        Err(e) => errors::cascade_error_to_response(e),
    }
}

/// DELETE /admin/users/:id - Remove a user with their flats and messages
pub async fn remove_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let user_id: UserId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::invalid_id(e),
    };

    match services.remove_user(&user_id).await {
        Ok(outcome) => errors::outcome_to_response(outcome),
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "cascade task failed");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "removal incomplete, retry",
            )
        }
    }
}
