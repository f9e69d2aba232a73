use thiserror::Error;

/// Errors raised across the hive workspace.
///
/// Calendar failures are reported through [`HiveError::Calendar`] but the
/// availability aggregator never propagates them; they only reach callers
/// that talk to a provider directly.
#[derive(Debug, Error)]
pub enum HiveError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Member {member} is not part of hive {hive}")]
    NotMember { member: String, hive: String },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Acceptance rate is undefined without at least one roster member.
    #[error("Cannot evaluate consensus for an empty roster")]
    EmptyRoster,

    #[error("Event {0} already reached a terminal state")]
    EventFinalized(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calendar error: {0}")]
    Calendar(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HiveError>;
