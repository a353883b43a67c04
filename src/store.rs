//! In-memory session registry with idle expiry
//!
//! Each session sits behind its own async mutex: one writer at a time, and a
//! crew call holds the lock until it returns, so a session never has two
//! engine calls in flight. Nothing is persisted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::session::{PlannerSession, SessionId};
use crate::{PlannerError, Result};

pub type SessionHandle = Arc<Mutex<PlannerSession>>;

pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
    idle_ttl: Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Opens a fresh idle session
    #[tracing::instrument(name = "create_session", level = "debug", skip(self))]
    pub async fn create(&self) -> SessionId {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(PlannerSession::new(id)));
        self.sessions.write().await.insert(id, handle);
        tracing::debug!(%id, "Session created");
        id
    }

    /// Looks up a session and marks it as used.
    /// Expired sessions are removed and reported as not found.
    #[tracing::instrument(name = "get_session", level = "debug", skip(self))]
    pub async fn get(&self, id: SessionId) -> Result<SessionHandle> {
        let handle = self
            .sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PlannerError::session_not_found(id))?;

        // a session busy with a crew call is in use, not idle
        let expired = match handle.try_lock() {
            Ok(mut session) => {
                if session.idle_for() > self.idle_ttl {
                    true
                } else {
                    session.touch();
                    false
                }
            }
            Err(_) => false,
        };

        if expired {
            tracing::debug!("Session found but expired");
            self.remove(id).await;
            return Err(PlannerError::session_not_found(id));
        }
        Ok(handle)
    }

    /// Ends a session; returns whether it existed
    pub async fn remove(&self, id: SessionId) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Drops every session idle for longer than the TTL; returns how many
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => session.idle_for() <= self.idle_ttl,
            Err(_) => true,
        });
        let purged = before - sessions.len();
        if purged > 0 {
            tracing::info!("Purged {} expired sessions", purged);
        }
        purged
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Periodically purges expired sessions; abort the returned handle to stop
pub fn spawn_purge_task(store: Arc<SessionStore>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // first tick fires immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            store.purge_expired().await;
        }
    })
}
