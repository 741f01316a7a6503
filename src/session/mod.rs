//! Volatile per-session conversation state.
//!
//! Sessions live in process memory only; restarts drop them and the SPA
//! re-initializes transparently. The store enforces the three bounds the
//! prototype backends never had: history length, idle expiry, and a live
//! session cap.

pub mod store;

pub use store::SessionStore;

use crate::llm::ChatTurn;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Onboarding answers the SPA collects before opening a chat. Field aliases
/// match the frontend's Spanish keys; unknown extras are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    #[serde(default, alias = "nombre")]
    pub name: Option<String>,
    #[serde(default, alias = "pasion")]
    pub interests: Option<String>,
    #[serde(default, alias = "meta")]
    pub goal: Option<String>,
    #[serde(default, alias = "aprendizaje")]
    pub learning_style: Option<String>,
}

impl StudentProfile {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.interests.is_none()
            && self.goal.is_none()
            && self.learning_style.is_none()
    }
}

/// One live mentor conversation.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub mentor_id: String,
    pub profile: StudentProfile,
    pub topic: String,
    pub history: Vec<ChatTurn>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    pub fn new(id: &str, mentor_id: &str, profile: StudentProfile, topic: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            mentor_id: mentor_id.to_string(),
            profile,
            topic: topic.to_string(),
            history: Vec::new(),
            created_at: now,
            last_active: now,
        }
    }
}
