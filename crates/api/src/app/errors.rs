use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use flatshare_core::DomainError;
use flatshare_infra::cascade::{CascadeError, Outcome};

use crate::app::dto::RemovalIncomplete;

/// `Success` is full removal (204). `Failure` is never a partial success: it is
/// reported as "removal incomplete, retry" with every reason attached.
pub fn outcome_to_response(outcome: Outcome) -> axum::response::Response {
    match outcome {
        Outcome::Success => StatusCode::NO_CONTENT.into_response(),
        Outcome::Failure(reasons) => (
            StatusCode::CONFLICT,
            axum::Json(RemovalIncomplete {
                error: "removal_incomplete",
                message: "removal incomplete, retry",
                reasons,
            }),
        )
            .into_response(),
    }
}

pub fn cascade_error_to_response(err: CascadeError) -> axum::response::Response {
    json_error(StatusCode::SERVICE_UNAVAILABLE, "query_failure", err.to_string())
}

pub fn invalid_id(err: DomainError) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_id", err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
