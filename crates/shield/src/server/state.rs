//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::auth::Authenticator;
use crate::pipeline::ProtectionPipeline;
use crate::session::SessionStore;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-wrapped or already `Arc`-backed) so
/// that Axum can clone the state for each request without copying expensive data.
#[derive(Clone)]
pub struct AppState {
    /// Tokenizer + envelope cipher façade.
    pub pipeline: Arc<ProtectionPipeline>,
    /// Live sessions and their keys.
    pub sessions: SessionStore,
    /// Decides whether a bearer credential is authenticated.
    pub authenticator: Arc<dyn Authenticator>,
    /// Name of the HTTP header that carries the session id.
    pub session_header_name: Arc<String>,
}

impl AppState {
    /// Create a new [`AppState`] from its parts.
    pub fn new(
        pipeline: ProtectionPipeline,
        sessions: SessionStore,
        authenticator: Arc<dyn Authenticator>,
        session_header_name: String,
    ) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            sessions,
            authenticator,
            session_header_name: Arc::new(session_header_name),
        }
    }
}

#[cfg(test)]
impl Default for AppState {
    /// An empty session store, a seeded pipeline, and the bearer token
    /// `"test-token"`.
    fn default() -> Self {
        use crate::auth::StaticTokenAuthenticator;
        use crate::crypto::RandomSource;

        let random = RandomSource::seeded(0);
        Self::new(
            ProtectionPipeline::new(random.clone(), 1024 * 1024),
            SessionStore::new(),
            Arc::new(StaticTokenAuthenticator::new("test-token", &random)),
            "X-Session-Id".into(),
        )
    }
}
