//! Axum middleware layers applied to the router.
//!
//! Includes bearer authentication, request tracing, timeout enforcement, and
//! response compression.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use common::ProtectionError;
use tracing::debug;

use super::{handlers::ApiError, state::AppState};

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reject requests without an authenticated `Authorization: Bearer` credential.
pub async fn require_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let authenticated = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| state.authenticator.is_authenticated(token.trim()));

    if authenticated {
        return next.run(req).await;
    }
    debug!(path = %req.uri().path(), "rejected unauthenticated request");
    ApiError(ProtectionError::Unauthenticated).into_response()
}
