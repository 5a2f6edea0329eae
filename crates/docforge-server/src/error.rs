//! Maps `docforge_domain::error::Error` onto HTTP responses and MCP tool
//! errors. One conversion site so every route returns consistent bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docforge_domain::error::Error as DomainError;
use serde::Serialize;

/// Thin wrapper so we can implement `IntoResponse` for a foreign type.
pub struct ApiError(pub DomainError);

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self(error)
    }
}

/// §4.9's status mapping, mirrored from the doc comments on `Error`'s
/// variants: validation/not_found/conflict map to their obvious 4xx,
/// upstream/transient map to 502/503, everything else is a 500.
fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Conflict { .. } => StatusCode::CONFLICT,
        DomainError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        DomainError::Transient { .. } => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::Fatal { .. }
        | DomainError::Configuration { .. }
        | DomainError::ConfigMissing(_)
        | DomainError::Database { .. }
        | DomainError::Network { .. }
        | DomainError::Internal { .. }
        | DomainError::Io { .. }
        | DomainError::Json { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let body = ErrorBody {
            error: self.0.kind(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Request bodies that fail `validator::Validate` are reported the same
/// shape as a domain validation error, before any handler logic runs.
pub struct ValidationRejection(pub validator::ValidationErrors);

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: "validation",
            message: self.0.to_string(),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Converts a domain error into an `rmcp` tool error, for the MCP surface.
/// Validation errors become `invalid_params`; everything else is reported
/// as `internal_error` — the MCP transport has no 404/409-style vocabulary.
#[must_use]
pub fn to_mcp_error(error: DomainError) -> rmcp::ErrorData {
    match &error {
        DomainError::Validation { .. } => rmcp::ErrorData::invalid_params(error.to_string(), None),
        _ => rmcp::ErrorData::internal_error(error.to_string(), None),
    }
}
