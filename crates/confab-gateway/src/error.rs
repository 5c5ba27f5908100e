use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use confab_core::RelayError;

/// Wraps [`RelayError`] for the HTTP surface: every failure becomes a
/// structured envelope `{"error": {"kind": ..., "message": ...}}` with a
/// status derived from the error kind.
#[derive(Debug)]
pub struct ApiError(pub RelayError);

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RelayError::NotFound(_) => StatusCode::NOT_FOUND,
            RelayError::ProviderUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RelayError::ProviderAuth(_) | RelayError::ProviderResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
            RelayError::Configuration(_)
            | RelayError::Persistence(_)
            | RelayError::Json(_)
            | RelayError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({
            "error": {
                "kind": self.0.kind(),
                "message": self.0.to_string(),
            }
        }));
        (status, body).into_response()
    }
}
