use crate::types::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted chat history is capped to this many entries on every write.
pub const CHAT_HISTORY_CAP: usize = 20;

/// Window of recent turns visible to the engagement floor and to the
/// coach request payload.
pub const RECENT_TURN_WINDOW: usize = 10;

/// Marker text prepended to the model-side message recorded whenever a
/// goal restarts. The deal gate counts user turns after the latest one.
pub const RESTART_MARKER: &str = "New journey started";

// ---------------------------------------------------------------------------
// ChatMessage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            created_at: now,
        }
    }

    pub fn model(text: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
            created_at: now,
        }
    }

    /// The system message recorded when a goal (re)starts.
    pub fn restart_marker(goal_title: &str, now: DateTime<Utc>) -> Self {
        Self::model(format!("{RESTART_MARKER}: {goal_title}"), now)
    }

    pub fn is_restart_marker(&self) -> bool {
        self.role == Role::Model && self.text.starts_with(RESTART_MARKER)
    }
}

// ---------------------------------------------------------------------------
// History helpers
// ---------------------------------------------------------------------------

/// Trim a history to the most recent `CHAT_HISTORY_CAP` entries.
pub fn cap_history(history: &mut Vec<ChatMessage>) {
    if history.len() > CHAT_HISTORY_CAP {
        history.drain(..history.len() - CHAT_HISTORY_CAP);
    }
}

/// The most recent turns, bounded to `RECENT_TURN_WINDOW`, oldest first.
pub fn recent_turns(history: &[ChatMessage]) -> &[ChatMessage] {
    let start = history.len().saturating_sub(RECENT_TURN_WINDOW);
    &history[start..]
}

/// Count user messages since the most recent restart marker, within the
/// visible recent-turn window. Feeds the deal gate's engagement floor.
pub fn user_messages_since_restart(history: &[ChatMessage]) -> usize {
    let mut count = 0;
    for msg in recent_turns(history) {
        if msg.is_restart_marker() {
            count = 0;
        } else if msg.role == Role::User {
            count += 1;
        }
    }
    count
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
