use super::{Session, StudentProfile};
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::llm::ChatTurn;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory session store shared by all gateway handlers.
///
/// Bounds enforced:
/// - history: at most `max_turns` turns per session, oldest dropped first
/// - expiry: sessions idle past `ttl_secs` are dropped lazily on access and
///   by the gateway's background sweep
/// - capacity: at most `max_sessions` live sessions; inserting past the cap
///   evicts the least-recently-active one
pub struct SessionStore {
    inner: RwLock<HashMap<String, Session>>,
    bounds: SessionConfig,
}

impl SessionStore {
    pub fn new(bounds: SessionConfig) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            bounds,
        }
    }

    // Out-of-range values saturate rather than panic; config validation caps
    // ttl_secs well below this.
    fn ttl(&self) -> Duration {
        i64::try_from(self.bounds.ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now - session.last_active > self.ttl()
    }

    /// Create or reset a session (`/init_session`): history starts empty even
    /// if the id was already known.
    pub fn init_session(
        &self,
        id: &str,
        mentor_id: &str,
        profile: StudentProfile,
        topic: &str,
    ) -> Result<Session, SessionError> {
        if id.trim().is_empty() {
            return Err(SessionError::InvalidId("blank session id".into()));
        }

        let session = Session::new(id, mentor_id, profile, topic);
        let mut map = self
            .inner
            .write()
            .map_err(|e| SessionError::Store(e.to_string()))?;
        if !map.contains_key(id) {
            Self::evict_for_capacity(&mut map, self.bounds.max_sessions);
        }
        map.insert(id.to_string(), session.clone());
        Ok(session)
    }

    /// Fetch a session for a chat turn, creating it transparently when the id
    /// is unknown (expired, evicted, or `/init_session` was skipped). Persona
    /// and topic follow the request; the SPA sends both on every turn.
    pub fn touch_for_chat(
        &self,
        id: &str,
        mentor_id: &str,
        profile: &StudentProfile,
        topic: &str,
    ) -> Result<Session, SessionError> {
        if id.trim().is_empty() {
            return Err(SessionError::InvalidId("blank session id".into()));
        }

        let now = Utc::now();
        let mut map = self
            .inner
            .write()
            .map_err(|e| SessionError::Store(e.to_string()))?;

        if let Some(session) = map.get(id)
            && self.is_expired(session, now)
        {
            map.remove(id);
        }

        if let Some(session) = map.get_mut(id) {
            session.mentor_id = mentor_id.to_string();
            session.topic = topic.to_string();
            if !profile.is_empty() {
                session.profile = profile.clone();
            }
            session.last_active = now;
            return Ok(session.clone());
        }

        Self::evict_for_capacity(&mut map, self.bounds.max_sessions);
        let session = Session::new(id, mentor_id, profile.clone(), topic);
        map.insert(id.to_string(), session.clone());
        Ok(session)
    }

    /// Append a turn, truncating to the history bound.
    pub fn append_turn(&self, id: &str, turn: ChatTurn) -> Result<(), SessionError> {
        let mut map = self
            .inner
            .write()
            .map_err(|e| SessionError::Store(e.to_string()))?;
        let session = map
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;

        session.history.push(turn);
        if session.history.len() > self.bounds.max_turns {
            let excess = session.history.len() - self.bounds.max_turns;
            session.history.drain(..excess);
        }
        session.last_active = Utc::now();
        Ok(())
    }

    /// Chronological history window for prompt assembly.
    pub fn history(&self, id: &str) -> Result<Vec<ChatTurn>, SessionError> {
        let map = self
            .inner
            .read()
            .map_err(|e| SessionError::Store(e.to_string()))?;
        map.get(id)
            .map(|session| session.history.clone())
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired session. Returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        self.prune_expired_at(Utc::now())
    }

    fn prune_expired_at(&self, now: DateTime<Utc>) -> usize {
        let Ok(mut map) = self.inner.write() else {
            return 0;
        };
        let before = map.len();
        map.retain(|_, session| !self.is_expired(session, now));
        before - map.len()
    }

    fn evict_for_capacity(map: &mut HashMap<String, Session>, max_sessions: usize) {
        while map.len() >= max_sessions {
            let Some(oldest_id) = map
                .values()
                .min_by_key(|session| session.last_active)
                .map(|session| session.id.clone())
            else {
                break;
            };
            map.remove(&oldest_id);
        }
    }
}
