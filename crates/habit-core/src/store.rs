//! Single persisted key-value document backing the ledger, timeline,
//! and chat history. Every mutator is a read-full-document, compute,
//! write-full-document round trip so concurrent in-memory edits from
//! other call sites within the same turn are never lost.

use crate::chat::{self, ChatMessage};
use crate::error::Result;
use crate::io;
use crate::ledger::CompletionLedger;
use crate::paths;
use crate::timeline::{Goal, GoalTimeline};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const DAY_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Raw on-disk shape. Collections stay as loose JSON values so one
/// malformed record can be skipped without losing the rest.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    /// Legacy single active-goal title; migration source only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    daily_goal: Option<String>,
    #[serde(default)]
    completions_by_date: BTreeMap<String, Value>,
    #[serde(default)]
    goal_history_v1: Vec<Value>,
    #[serde(default)]
    chat_history_v1: Vec<Value>,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn open(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Create the `.habit/` directory and an empty store document if
    /// absent. Idempotent.
    pub fn init(&self) -> Result<()> {
        io::ensure_dir(&paths::habit_dir(&self.root))?;
        io::write_if_missing(&paths::store_path(&self.root), b"{}\n")?;
        Ok(())
    }

    pub fn exists(&self) -> bool {
        paths::store_path(&self.root).exists()
    }

    /// Full reset: the only path that ever deletes ledger entries.
    pub fn reset(&self) -> Result<()> {
        self.write(&Document::default())
    }

    fn read(&self) -> Document {
        let path = paths::store_path(&self.root);
        let Ok(data) = std::fs::read_to_string(&path) else {
            return Document::default();
        };
        // A malformed top-level document is recoverable, never fatal.
        serde_json::from_str(&data).unwrap_or_default()
    }

    fn write(&self, doc: &Document) -> Result<()> {
        let data = serde_json::to_string_pretty(doc)?;
        io::atomic_write(&paths::store_path(&self.root), data.as_bytes())
    }

    // ---------------------------------------------------------------------------
    // Completion ledger
    // ---------------------------------------------------------------------------

    /// Decode the ledger snapshot, skipping malformed day keys and
    /// non-boolean values individually.
    pub fn ledger(&self) -> CompletionLedger {
        let doc = self.read();
        let entries = doc.completions_by_date.iter().filter_map(|(key, value)| {
            let day = NaiveDate::parse_from_str(key, DAY_FORMAT).ok()?;
            let done = value.as_bool()?;
            Some((day, done))
        });
        CompletionLedger::from_entries(entries)
    }

    pub fn mark_done(&self, day: NaiveDate) -> Result<()> {
        self.upsert_completion(day, true)
    }

    pub fn mark_not_done(&self, day: NaiveDate) -> Result<()> {
        self.upsert_completion(day, false)
    }

    fn upsert_completion(&self, day: NaiveDate, done: bool) -> Result<()> {
        let mut doc = self.read();
        doc.completions_by_date
            .insert(day.format(DAY_FORMAT).to_string(), Value::Bool(done));
        self.write(&doc)
    }

    // ---------------------------------------------------------------------------
    // Goal timeline
    // ---------------------------------------------------------------------------

    /// Decode the timeline, skipping malformed records. When no valid
    /// record remains but the legacy `daily_goal` value is non-empty,
    /// seed one synthesized active goal (one-time migration; the seed
    /// stops firing once a real timeline is saved).
    pub fn timeline(&self, now: DateTime<Utc>) -> GoalTimeline {
        let doc = self.read();
        let goals: Vec<Goal> = doc
            .goal_history_v1
            .iter()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect();
        let timeline = GoalTimeline::from_records(goals);
        if timeline.is_empty() {
            if let Some(legacy) = doc.daily_goal.as_deref() {
                if !legacy.trim().is_empty() {
                    return GoalTimeline::from_legacy_title(legacy, now);
                }
            }
        }
        timeline
    }

    pub fn save_timeline(&self, timeline: &GoalTimeline) -> Result<()> {
        let mut doc = self.read();
        doc.goal_history_v1 = timeline
            .history()
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<_, _>>()?;
        self.write(&doc)
    }

    // ---------------------------------------------------------------------------
    // Chat history
    // ---------------------------------------------------------------------------

    /// Decode the chat history, skipping malformed entries.
    pub fn chat_history(&self) -> Vec<ChatMessage> {
        self.read()
            .chat_history_v1
            .iter()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect()
    }

    /// Append turns and cap the persisted history to the most recent
    /// twenty entries.
    pub fn append_chat(&self, messages: &[ChatMessage]) -> Result<()> {
        let mut doc = self.read();
        for msg in messages {
            doc.chat_history_v1.push(serde_json::to_value(msg)?);
        }
        if doc.chat_history_v1.len() > chat::CHAT_HISTORY_CAP {
            let excess = doc.chat_history_v1.len() - chat::CHAT_HISTORY_CAP;
            doc.chat_history_v1.drain(..excess);
        }
        self.write(&doc)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
