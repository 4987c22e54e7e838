//! In-memory store of the active counting sessions.

use std::{collections::HashMap, sync::Arc, time::Duration};

use engine::Tally;
use tokio::{sync::Mutex, time::Instant};
use uuid::Uuid;

/// Sessions left untouched this long are dropped, along with unsaved counts.
pub(crate) const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(4 * 60 * 60);

struct Entry {
    tally: Arc<Mutex<Tally>>,
    touched: Instant,
}

/// One tally per session id. Each tally sits behind its own lock so
/// adjustments and commits of one session are serialized without blocking
/// the others.
#[derive(Clone)]
pub(crate) struct SessionStore {
    inner: Arc<Mutex<HashMap<Uuid, Entry>>>,
    idle_ttl: Duration,
}

/// The session a request belongs to, inserted by the session middleware.
#[derive(Clone)]
pub(crate) struct ActiveSession {
    pub id: Uuid,
    pub tally: Arc<Mutex<Tally>>,
}

impl SessionStore {
    pub(crate) fn new(idle_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            idle_ttl,
        }
    }

    pub(crate) async fn insert(&self, tally: Tally) -> Uuid {
        let id = Uuid::new_v4();
        let now = Instant::now();
        let mut guard = self.inner.lock().await;
        self.evict_idle(&mut guard, now);
        guard.insert(
            id,
            Entry {
                tally: Arc::new(Mutex::new(tally)),
                touched: now,
            },
        );
        id
    }

    /// Look a session up and mark it as used.
    pub(crate) async fn get(&self, id: Uuid) -> Option<ActiveSession> {
        let now = Instant::now();
        let mut guard = self.inner.lock().await;
        self.evict_idle(&mut guard, now);
        guard.get_mut(&id).map(|entry| {
            entry.touched = now;
            ActiveSession {
                id,
                tally: entry.tally.clone(),
            }
        })
    }

    pub(crate) async fn remove(&self, id: Uuid) -> bool {
        let mut guard = self.inner.lock().await;
        guard.remove(&id).is_some()
    }

    fn evict_idle(&self, sessions: &mut HashMap<Uuid, Entry>, now: Instant) {
        sessions.retain(|id, entry| {
            let alive = now.duration_since(entry.touched) < self.idle_ttl;
            if !alive {
                tracing::info!("session {id} expired after {:?} idle", self.idle_ttl);
            }
            alive
        });
    }
}
