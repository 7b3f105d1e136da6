//! In-memory session store.
//!
//! Each session owns the decoded bitmap, the current crop selection, the
//! aspect constraint, and the last rendered report. Every user action locks
//! its session for the action's full duration, so actions on one session run
//! to completion before the next is accepted; distinct sessions do not
//! contend.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use croploc_image::DecodedUpload;
use croploc_models::{AspectConstraint, CropSelection, SessionPhase};
use tokio::sync::{Mutex, RwLock};
use tracing::warn;
use uuid::Uuid;

use crate::render::RenderedReport;

/// Maximum number of live sessions to track.
const MAX_SESSIONS: usize = 10_000;

/// Idle time after which a session may be evicted (1 hour).
const SESSION_TTL: Duration = Duration::from_secs(3600);

/// One interactive crop-and-detect session.
#[derive(Debug)]
pub struct Session {
    pub phase: SessionPhase,
    pub image: Option<DecodedUpload>,
    pub selection: Option<CropSelection>,
    pub aspect: AspectConstraint,
    pub report: Option<RenderedReport>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            phase: SessionPhase::AwaitingUpload,
            image: None,
            selection: None,
            aspect: AspectConstraint::Free,
            report: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump the modification timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

type SessionHandle = Arc<Mutex<Session>>;

/// Uuid-keyed session map with TTL and capacity eviction.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, (SessionHandle, Instant)>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a new session and return its id.
    pub async fn create(&self) -> Uuid {
        let mut sessions = self.inner.write().await;

        if sessions.len() >= MAX_SESSIONS {
            Self::evict(&mut sessions);
        }

        let id = Uuid::new_v4();
        sessions.insert(id, (Arc::new(Mutex::new(Session::new())), Instant::now()));
        id
    }

    /// Look up a session, refreshing its idle timer.
    pub async fn get(&self, id: &Uuid) -> Option<SessionHandle> {
        let mut sessions = self.inner.write().await;
        sessions.get_mut(id).map(|(handle, touched)| {
            *touched = Instant::now();
            Arc::clone(handle)
        })
    }

    /// Remove a session. Returns true if it existed.
    pub async fn remove(&self, id: &Uuid) -> bool {
        let mut sessions = self.inner.write().await;
        sessions.remove(id).is_some()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Drop idle sessions; if still at capacity, drop the oldest entries.
    fn evict(sessions: &mut HashMap<Uuid, (SessionHandle, Instant)>) {
        let now = Instant::now();
        sessions.retain(|_, (_, touched)| now.duration_since(*touched) < SESSION_TTL);

        if sessions.len() >= MAX_SESSIONS {
            let mut entries: Vec<_> = sessions.iter().map(|(id, (_, t))| (*id, *t)).collect();
            entries.sort_by_key(|(_, t)| *t);

            let to_remove = sessions.len() + 1 - MAX_SESSIONS;
            for (id, _) in entries.into_iter().take(to_remove) {
                sessions.remove(&id);
            }
            warn!("Session store at capacity, removed {} entries", to_remove);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get() {
        let store = SessionStore::new();
        let id = store.create().await;

        let handle = store.get(&id).await.unwrap();
        let session = handle.lock().await;
        assert_eq!(session.phase, SessionPhase::AwaitingUpload);
        assert!(session.image.is_none());
        assert_eq!(session.aspect, AspectConstraint::Free);
    }

    #[tokio::test]
    async fn test_get_unknown_is_none() {
        let store = SessionStore::new();
        assert!(store.get(&Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_remove() {
        let store = SessionStore::new();
        let id = store.create().await;
        assert_eq!(store.len().await, 1);

        assert!(store.remove(&id).await);
        assert!(!store.remove(&id).await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let store = SessionStore::new();
        let a = store.create().await;
        let b = store.create().await;

        {
            let handle = store.get(&a).await.unwrap();
            let mut session = handle.lock().await;
            session.phase = SessionPhase::AwaitingCrop;
        }

        let handle = store.get(&b).await.unwrap();
        let session = handle.lock().await;
        assert_eq!(session.phase, SessionPhase::AwaitingUpload);
    }
}
