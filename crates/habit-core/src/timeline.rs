use crate::ledger::CompletionLedger;
use crate::types::GoalStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Goal
// ---------------------------------------------------------------------------

/// A single habit goal. Per slot the state machine is
/// `active -> {completed, dropped}`; terminal goals are never reactivated
/// and `final_streak` is frozen at the moment of archival.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: GoalStatus,
    pub final_streak: u32,
}

impl Goal {
    pub fn new_active(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            start_date: now,
            end_date: None,
            status: GoalStatus::Active,
            final_streak: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == GoalStatus::Active
    }

    fn archive(&mut self, status: GoalStatus, final_streak: u32, now: DateTime<Utc>) {
        self.status = status;
        self.end_date = Some(now);
        self.final_streak = final_streak;
    }
}

// ---------------------------------------------------------------------------
// GoalTimeline
// ---------------------------------------------------------------------------

/// Ordered collection of goal records, newest first. Owns all Goal
/// records; at most one is active at any time. History is append-only
/// aside from invariant repair on load.
#[derive(Debug, Clone, Default)]
pub struct GoalTimeline {
    goals: Vec<Goal>,
}

impl GoalTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted records: empty-titled goals are filtered
    /// out, ordering is restored (start date descending), and if more
    /// than one active entry survived, only the first is kept active;
    /// the extras are discarded to restore the single-active invariant.
    pub fn from_records(records: Vec<Goal>) -> Self {
        let mut goals: Vec<Goal> = records
            .into_iter()
            .filter(|g| !g.title.trim().is_empty())
            .collect();
        goals.sort_by(|a, b| b.start_date.cmp(&a.start_date));

        let mut seen_active = false;
        goals.retain(|g| {
            if g.is_active() {
                if seen_active {
                    return false;
                }
                seen_active = true;
            }
            true
        });

        Self { goals }
    }

    /// Seed from the legacy single-goal value (one-time migration).
    pub fn from_legacy_title(title: &str, now: DateTime<Utc>) -> Self {
        Self {
            goals: vec![Goal::new_active(title.trim(), now)],
        }
    }

    // ---------------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------------

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn active_goal(&self) -> Option<&Goal> {
        self.goals.iter().find(|g| g.is_active())
    }

    /// All goals, newest first.
    pub fn history(&self) -> &[Goal] {
        &self.goals
    }

    // ---------------------------------------------------------------------------
    // Transitions
    // ---------------------------------------------------------------------------

    /// Start a new active goal without archiving the current one.
    /// Re-entry with the identical (case-insensitive, trimmed) title of
    /// the current active goal is a no-op. Returns true if a goal was
    /// created.
    pub fn start_new_goal(&mut self, title: &str, now: DateTime<Utc>) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        if let Some(active) = self.active_goal() {
            if active.title.trim().eq_ignore_ascii_case(title) {
                return false;
            }
        }
        self.goals.insert(0, Goal::new_active(title, now));
        true
    }

    /// Archive the current active goal (normalized terminal status, end
    /// date, caller-supplied frozen streak) and prepend a fresh active
    /// goal. An empty replacement title makes the whole call a no-op,
    /// so the active slot is never traded for a record the load-time
    /// filter would discard. Only the first active entry is archived;
    /// stray extras are dropped from the collection. Returns true if
    /// the transition happened.
    pub fn transition_goal(
        &mut self,
        new_title: &str,
        previous_status: &str,
        final_streak: u32,
        now: DateTime<Utc>,
    ) -> bool {
        let new_title = new_title.trim();
        if new_title.is_empty() {
            return false;
        }
        self.archive_first_active(GoalStatus::normalize_terminal(previous_status), final_streak, now);
        self.goals.insert(0, Goal::new_active(new_title, now));
        true
    }

    /// Archive the current active goal without creating a replacement.
    /// The frozen streak is computed from the ledger at call time.
    /// Returns the archived goal's id, or None when nothing was active.
    pub fn archive_active_goal(
        &mut self,
        status: GoalStatus,
        ledger: &CompletionLedger,
        now: DateTime<Utc>,
    ) -> Option<Uuid> {
        let streak = ledger.streak(now.date_naive());
        let terminal = GoalStatus::normalize_terminal(status.as_str());
        self.archive_first_active(terminal, streak, now)
    }

    fn archive_first_active(
        &mut self,
        status: GoalStatus,
        final_streak: u32,
        now: DateTime<Utc>,
    ) -> Option<Uuid> {
        let mut archived = None;
        for goal in self.goals.iter_mut() {
            if goal.is_active() {
                goal.archive(status, final_streak, now);
                archived = Some(goal.id);
                break;
            }
        }
        // Any remaining active entries are invariant violations; drop them.
        if archived.is_some() {
            self.goals.retain(|g| !g.is_active());
        }
        archived
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
