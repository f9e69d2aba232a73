//! Member identity and calendar credentials.

use serde::{Deserialize, Serialize};

/// Opaque identifier of a hive member.
///
/// `MemberId` is a lightweight wrapper around `String`, designed to:
/// - Keep member ids apart from hive and event ids at the type level
/// - Serve as an ordered map key for vote tallies
/// - Format directly in log lines
#[derive(Default, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub String);

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MemberId {
    fn from(s: &str) -> Self {
        MemberId(s.to_string())
    }
}

/// Refresh token for the member's external calendar.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarCredential(pub String);

impl std::fmt::Debug for CalendarCredential {
    // Tokens end up in debug logs otherwise.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CalendarCredential(***)")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing)]
    pub calendar: Option<CalendarCredential>,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            calendar: None,
        }
    }

    pub fn with_calendar(mut self, refresh_token: impl Into<String>) -> Self {
        self.calendar = Some(CalendarCredential(refresh_token.into()));
        self
    }

    pub fn has_calendar_access(&self) -> bool {
        self.calendar.is_some()
    }
}

impl From<String> for MemberId {
    fn from(s: String) -> Self {
        MemberId(s)
    }
}
