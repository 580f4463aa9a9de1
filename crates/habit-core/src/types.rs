use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// GoalStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Completed,
    Dropped,
}

impl GoalStatus {
    pub fn all() -> &'static [GoalStatus] {
        &[GoalStatus::Active, GoalStatus::Completed, GoalStatus::Dropped]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Completed => "completed",
            GoalStatus::Dropped => "dropped",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, GoalStatus::Active)
    }

    /// Normalize an arbitrary status string to a valid archival status.
    /// Only `completed` survives as-is; everything else becomes `dropped`.
    pub fn normalize_terminal(s: &str) -> GoalStatus {
        match s.trim().to_lowercase().as_str() {
            "completed" => GoalStatus::Completed,
            _ => GoalStatus::Dropped,
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GoalStatus {
    type Err = crate::error::HabitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(GoalStatus::Active),
            "completed" => Ok(GoalStatus::Completed),
            "dropped" => Ok(GoalStatus::Dropped),
            _ => Err(crate::error::HabitError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// Coarse activity category used to sanity-check that a negotiated deal
/// matches the spirit of the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Read,
    Move,
    Workout,
    Sleep,
    Wellness,
    Unknown,
}

impl Domain {
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Read => "read",
            Domain::Move => "move",
            Domain::Workout => "workout",
            Domain::Sleep => "sleep",
            Domain::Wellness => "wellness",
            Domain::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
