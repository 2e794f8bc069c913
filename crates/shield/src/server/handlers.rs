//! Axum request handlers for all service endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::{
    protocol::{
        ClassifyRequest, ClassifyResponse, ErrorResponse, HealthResponse, ProtectRequest,
        ProtectionResult, RevealRequest, RevealResponse, SessionResponse, TokenizationMethod,
    },
    ProtectionError,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::state::AppState;
use crate::session::{Session, SessionError};

/// A [`ProtectionError`] rendered as `(status, Json<ErrorResponse>)`.
#[derive(Debug)]
pub struct ApiError(pub ProtectionError);

impl From<ProtectionError> for ApiError {
    fn from(err: ProtectionError) -> Self {
        Self(err)
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::UnknownSession(id) => {
                Self(ProtectionError::UnknownSession(id.to_string()))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!(error = %self.0, "request failed");
        }
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

/// `POST /sessions`: Start a new session.
pub async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.sessions.create().await;
    info!(session = %session.id(), "session created");
    (
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id: session.id().to_string(),
        }),
    )
}

/// `DELETE /sessions/:id`: End a session and drop its key.
pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_session_id(&id)?;
    state.sessions.end(id).await?;
    info!(session = %id, "session ended");
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /protect`: Mask or seal the request text.
///
/// The session is identified by the `X-Session-Id` header (or the configured
/// header name).
pub async fn protect(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ProtectRequest>,
) -> Result<Json<ProtectionResult>, ApiError> {
    let method: TokenizationMethod = req.method.parse()?;
    let session = session_from_headers(&state, &headers).await?;
    let result = state.pipeline.protect(&session, &req.text, method).await?;
    Ok(Json(result))
}

/// `POST /reveal`: Open an envelope with the session's key.
pub async fn reveal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RevealRequest>,
) -> Result<Json<RevealResponse>, ApiError> {
    let session = session_from_headers(&state, &headers).await?;
    let text = state.pipeline.reveal_for_session(&session, &req.text).await?;
    Ok(Json(RevealResponse { text }))
}

/// `POST /classify`: Report the sensitive kind of every line.
pub async fn classify(
    State(state): State<AppState>,
    Json(req): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let lines = state.pipeline.classify_text(&req.text)?;
    Ok(Json(ClassifyResponse { lines }))
}

/// `GET /health`: Liveness check.
pub async fn health(State(state): State<AppState>) -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        active_sessions: state.sessions.len().await,
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Session header helpers
// ---------------------------------------------------------------------------

fn parse_session_id(raw: &str) -> Result<Uuid, ProtectionError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ProtectionError::BadRequest(format!("malformed session id: {raw}")))
}

async fn session_from_headers(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Arc<Session>, ApiError> {
    let name = state.session_header_name.as_str();
    let raw = headers
        .get(name)
        .ok_or_else(|| ProtectionError::BadRequest(format!("missing {name} header")))?
        .to_str()
        .map_err(|_| {
            ProtectionError::BadRequest(format!("{name} header contains non-ASCII characters"))
        })?;
    let id = parse_session_id(raw)?;
    Ok(state.sessions.get(id).await?)
}
