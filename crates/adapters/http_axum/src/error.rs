//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use icv6_domain::error::Icv6Error;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

/// Maps [`Icv6Error`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(Icv6Error);

impl From<Icv6Error> for ApiError {
    fn from(err: Icv6Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let (status, message) = match &self.0 {
            Icv6Error::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Icv6Error::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            Icv6Error::Device(_) => {
                let report = self.0.report();
                tracing::warn!(error = %report, "device unavailable");
                (StatusCode::BAD_GATEWAY, report)
            }
            Icv6Error::Storage(_) => {
                tracing::error!(error = %self.0.report(), "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorBody {
                error: message,
                kind,
            }),
        )
            .into_response()
    }
}
