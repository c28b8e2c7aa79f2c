//! Per-user analysis sessions.
//!
//! A session holds the latest analysis outcome plus its quiz. "Analyze" with
//! an existing session id replaces the session wholesale; sessions expire
//! lazily after a TTL and can be deleted explicitly.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use lyric_utils::quiz::Quiz;
use uuid::Uuid;

use crate::pipeline::AnalysisOutcome;

pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60);

pub struct Session {
    pub outcome: Arc<AnalysisOutcome>,
    pub quiz: Quiz,
    created_at: Instant,
}

impl Session {
    pub fn new(outcome: Arc<AnalysisOutcome>, quiz: Quiz) -> Self {
        Self {
            outcome,
            quiz,
            created_at: Instant::now(),
        }
    }
}

pub struct SessionStore {
    sessions: DashMap<Uuid, Session>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Store a session. An existing id replaces its previous session; no id
    /// creates a fresh one.
    pub fn put(&self, id: Option<Uuid>, session: Session) -> Uuid {
        let id = id.unwrap_or_else(Uuid::new_v4);
        self.sessions.insert(id, session);
        id
    }

    /// Read access. Expired sessions are removed on the way out.
    pub fn with<R>(&self, id: Uuid, f: impl FnOnce(&Session) -> R) -> Option<R> {
        if self.expire_if_stale(id) {
            return None;
        }
        self.sessions.get(&id).map(|session| f(&session))
    }

    /// Mutable access, same expiry rules.
    pub fn with_mut<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        if self.expire_if_stale(id) {
            return None;
        }
        self.sessions.get_mut(&id).map(|mut session| f(&mut session))
    }

    pub fn remove(&self, id: Uuid) -> bool {
        self.sessions.remove(&id).is_some()
    }

    fn expire_if_stale(&self, id: Uuid) -> bool {
        let stale = match self.sessions.get(&id) {
            Some(session) => session.created_at.elapsed() > self.ttl,
            None => return false,
        };
        if stale {
            self.sessions.remove(&id);
        }
        stale
    }
}
