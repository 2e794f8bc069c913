//! Caller sessions and the symmetric key each one owns.
//!
//! # Lifecycle
//!
//! 1. `POST /sessions` creates a [`Session`] in the [`SessionStore`]. It starts
//!    without a key.
//! 2. The first `vault-based` protect call creates the key through
//!    [`Session::get_or_create_key`]; concurrent first calls observe the same key.
//! 3. The key is read for every later seal and reveal and is never replaced.
//! 4. The session ends on `DELETE /sessions/:id` or when [`eviction_task`]
//!    finds it idle; dropping the last handle zeroes the key.
//!
//! # Security invariants
//!
//! - Keys are never persisted, logged, or returned over the API. Logs carry
//!   only [`SymmetricKey::fingerprint`].

pub mod store;

pub use store::{SessionError, SessionStore};

use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use tokio::{sync::OnceCell, time};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::crypto::{EnvelopeCipher, SymmetricKey};

/// One authenticated caller's session.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    key: OnceCell<SymmetricKey>,
    last_seen: Mutex<Instant>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            key: OnceCell::new(),
            last_seen: Mutex::new(Instant::now()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The session key, if one has been created.
    pub fn key(&self) -> Option<&SymmetricKey> {
        self.key.get()
    }

    /// Return the session key, generating it with `cipher` on first use.
    ///
    /// Idempotent and race-free: when several tasks call this concurrently on
    /// a fresh session exactly one key is generated and all of them see it.
    pub async fn get_or_create_key(&self, cipher: &EnvelopeCipher) -> &SymmetricKey {
        self.key
            .get_or_init(|| async {
                let key = cipher.generate_key().await;
                info!(session = %self.id, key = %key.fingerprint(), "session key created");
                key
            })
            .await
    }

    /// Record activity on the session.
    pub fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    /// Time since the session was last used.
    pub fn idle_for(&self) -> Duration {
        self.last_seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn a background task that periodically ends idle sessions.
///
/// The first sweep fires after one full interval.
pub fn eviction_task(store: SessionStore, cfg: &Config) -> tokio::task::JoinHandle<()> {
    let interval = Duration::from_secs(cfg.session_sweep_interval_secs);
    let max_idle = Duration::from_secs(cfg.session_idle_timeout_secs);
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        // First tick fires immediately; skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = store.evict_idle(max_idle).await;
            if evicted > 0 {
                info!(evicted, "evicted idle sessions");
            } else {
                debug!("no idle sessions to evict");
            }
        }
    })
}
