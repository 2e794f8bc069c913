//! [`SessionStore`]: thread-safe registry of live sessions.

use std::{collections::HashMap, sync::Arc, time::Duration};

use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Session;

/// Errors produced by the session layer.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No live session has this identifier.
    #[error("unknown session: {0}")]
    UnknownSession(Uuid),
}

/// Thread-safe store of sessions keyed by id.
///
/// Wraps an `Arc<RwLock<HashMap<..>>>` so that:
/// - Request handlers take a short read lock to look a session up and then
///   work on their own `Arc<Session>` without holding the lock.
/// - Creation, removal and the eviction sweep take the write lock briefly.
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Arc<Session>>>>,
}

impl SessionStore {
    /// Create a new, empty [`SessionStore`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new session and return it.
    pub async fn create(&self) -> Arc<Session> {
        let session = Arc::new(Session::new());
        self.inner
            .write()
            .await
            .insert(session.id(), Arc::clone(&session));
        session
    }

    /// Look up a live session and mark it as used.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownSession`] if no such session exists.
    pub async fn get(&self, id: Uuid) -> Result<Arc<Session>, SessionError> {
        let lock = self.inner.read().await;
        let session = lock
            .get(&id)
            .cloned()
            .ok_or(SessionError::UnknownSession(id))?;
        session.touch();
        Ok(session)
    }

    /// End a session. Its key is destroyed once the last in-flight request
    /// holding the session finishes.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownSession`] if no such session exists.
    pub async fn end(&self, id: Uuid) -> Result<(), SessionError> {
        self.inner
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(SessionError::UnknownSession(id))
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Remove every session idle for at least `max_idle`. Returns how many were removed.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut lock = self.inner.write().await;
        let before = lock.len();
        lock.retain(|_, session| session.idle_for() < max_idle);
        before - lock.len()
    }
}
