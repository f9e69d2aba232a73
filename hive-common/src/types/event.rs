use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a proposed event.
#[derive(Default, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    /// Fresh random id for a newly created event.
    pub fn generate() -> Self {
        EventId(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        EventId(s.to_string())
    }
}

/// A member's answer to a proposed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Accept,
    Decline,
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Vote::Accept => "accept",
            Vote::Decline => "decline",
        };
        write!(f, "{}", s)
    }
}

/// Swipe gesture as sent by clients. Right accepts, left declines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
}

impl fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwipeDirection::Left => write!(f, "left"),
            SwipeDirection::Right => write!(f, "right"),
        }
    }
}

impl From<SwipeDirection> for Vote {
    fn from(direction: SwipeDirection) -> Self {
        match direction {
            SwipeDirection::Right => Vote::Accept,
            SwipeDirection::Left => Vote::Decline,
        }
    }
}

impl From<Vote> for SwipeDirection {
    fn from(vote: Vote) -> Self {
        match vote {
            Vote::Accept => SwipeDirection::Right,
            Vote::Decline => SwipeDirection::Left,
        }
    }
}

/// Lifecycle of a proposed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Proposed,
    Confirmed,
    Cancelled,
}

impl EventStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventStatus::Confirmed | EventStatus::Cancelled)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventStatus::Proposed => "proposed",
            EventStatus::Confirmed => "confirmed",
            EventStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swipe_maps_to_vote() {
        assert_eq!(Vote::from(SwipeDirection::Right), Vote::Accept);
        assert_eq!(Vote::from(SwipeDirection::Left), Vote::Decline);
    }

    #[test]
    fn test_swipe_wire_format() {
        let dir: SwipeDirection = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(dir, SwipeDirection::Right);
        assert!(serde_json::from_str::<SwipeDirection>("\"up\"").is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!EventStatus::Proposed.is_terminal());
        assert!(EventStatus::Confirmed.is_terminal());
        assert!(EventStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(EventId::generate(), EventId::generate());
    }
}
