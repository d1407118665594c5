// src/engine/store.rs

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::task::JoinHandle;

use super::session::Session;

/// Shared, individually locked session. Holding the lock makes a
/// read-modify-write on one session atomic without blocking others.
pub type SessionHandle = Arc<tokio::sync::Mutex<Session>>;

/// Mapping of session id to live session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores `session` under its own id.
    async fn create(&self, session: Session) -> SessionHandle;

    /// Looks up a live session and marks it as used.
    async fn get(&self, id: &str) -> Option<SessionHandle>;

    async fn remove(&self, id: &str) -> bool;

    /// Removes sessions unused for at least `ttl`. Returns how many were removed.
    async fn evict_idle(&self, ttl: Duration) -> usize;

    async fn len(&self) -> usize;
}

struct Entry {
    handle: SessionHandle,
    last_used: Instant,
}

/// Process-local session store.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<String, Entry>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: Session) -> SessionHandle {
        let id = session.id.clone();
        let handle = Arc::new(tokio::sync::Mutex::new(session));
        self.lock().insert(
            id,
            Entry {
                handle: handle.clone(),
                last_used: Instant::now(),
            },
        );
        handle
    }

    async fn get(&self, id: &str) -> Option<SessionHandle> {
        let mut sessions = self.lock();
        let entry = sessions.get_mut(id)?;
        entry.last_used = Instant::now();
        Some(entry.handle.clone())
    }

    async fn remove(&self, id: &str) -> bool {
        self.lock().remove(id).is_some()
    }

    async fn evict_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_used.elapsed() < ttl);
        before - sessions.len()
    }

    async fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Periodically evicts idle sessions until the runtime shuts down.
pub fn spawn_reaper(
    store: Arc<dyn SessionStore>,
    ttl: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = store.evict_idle(ttl).await;
            if evicted > 0 {
                tracing::info!(
                    "Evicted {} idle sessions ({} live)",
                    evicted,
                    store.len().await
                );
            }
        }
    })
}
