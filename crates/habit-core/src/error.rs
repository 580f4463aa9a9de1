use thiserror::Error;

#[derive(Debug, Error)]
pub enum HabitError {
    #[error("no active goal: set one with 'tinyhabit goal set <title>'")]
    GoalNotSet,

    #[error("message cannot be empty")]
    EmptyMessage,

    #[error("goal title cannot be empty")]
    EmptyTitle,

    #[error("invalid goal status: {0}")]
    InvalidStatus(String),

    #[error("invalid day '{0}': expected YYYY-MM-DD")]
    InvalidDay(String),

    #[error("coach unavailable: {reason}")]
    CoachUnavailable { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, HabitError>;
