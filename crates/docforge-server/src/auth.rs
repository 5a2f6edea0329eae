//! Bearer-token auth for the HTTP surface, gated on `ServerConfig::mcp_auth_token`.
//! When unset, every request is admitted — docforge is expected to sit
//! behind a trusted proxy in that mode.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct AuthErrorBody {
    error: &'static str,
    message: String,
}

fn rejection(status: StatusCode, error: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(AuthErrorBody {
            error,
            message: message.into(),
        }),
    )
        .into_response()
}

/// Rejects requests missing or presenting the wrong `Authorization: Bearer`
/// token. A no-op when no token is configured.
pub async fn require_bearer_token(State(state): State<AppState>, request: Request<Body>, next: Next) -> Response {
    let Some(expected) = &state.config.mcp_auth_token else {
        return next.run(request).await;
    };

    let header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let Some(header) = header else {
        return rejection(
            StatusCode::UNAUTHORIZED,
            "missing_authorization",
            "expected an Authorization: Bearer <token> header",
        );
    };

    let Some(token) = header.strip_prefix("Bearer ") else {
        return rejection(StatusCode::UNAUTHORIZED, "malformed_authorization", "expected a Bearer token");
    };

    if token != expected {
        return rejection(StatusCode::UNAUTHORIZED, "invalid_token", "bearer token did not match");
    }

    next.run(request).await
}
