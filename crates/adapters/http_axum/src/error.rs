//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use thermobridge_domain::error::BridgeError;

/// JSON error body returned by admin endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`BridgeError`] to an HTTP response with appropriate status code.
pub struct ApiError(BridgeError);

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            BridgeError::ZoneNotFound(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            BridgeError::InvalidParameter(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            BridgeError::Platform(err) => {
                tracing::error!(error = %err, "collaborator platform error");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
