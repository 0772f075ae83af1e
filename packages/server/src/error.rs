use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use copydesk_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Every failed check in the request, reported together
    #[error("Validation failed: {0:?}")]
    Validation(Vec<String>),

    #[error("Origin not allowed: {0}")]
    OriginNotAllowed(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "success": false, "errors": errors }),
            ),
            ApiError::OriginNotAllowed(origin) => (
                StatusCode::FORBIDDEN,
                serde_json::json!({
                    "success": false,
                    "message": format!("Origin not allowed: {}", origin),
                }),
            ),
            ApiError::Store(err) => {
                tracing::error!(error = %err, "edit store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "success": false, "message": "storage failure" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
