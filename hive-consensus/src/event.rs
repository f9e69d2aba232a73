use std::collections::HashSet;

use chrono::{DateTime, Utc};
use hive_common::{EventId, EventStatus, HiveError, HiveId, MemberId, Result};
use serde::{Deserialize, Serialize};

use crate::consensus::{
    evaluator::{ConsensusDecision, ConsensusResult},
    registry::VoteRegistry,
};

/// Where an event takes place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    /// `[longitude, latitude]`.
    #[serde(default)]
    pub coordinates: Option<[f64; 2]>,
}

/// Data supplied by the member creating an event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub hive_id: HiveId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    pub created_by: MemberId,
}

/// Editable details of an existing event. Absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
}

/// A group activity under consensus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedEvent {
    pub id: EventId,
    pub hive_id: HiveId,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<Location>,
    candidate_times: Vec<DateTime<Utc>>,
    #[serde(flatten)]
    votes: VoteRegistry,
    status: EventStatus,
    confirmed_time: Option<DateTime<Utc>>,
    pub created_by: MemberId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProposedEvent {
    pub const MAX_CANDIDATES: usize = 3;

    /// Creates a `proposed` event with its (immutable) candidate times.
    pub fn new(
        request: NewEvent,
        candidate_times: Vec<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if request.title.trim().is_empty() {
            return Err(HiveError::InvalidInput("event title is required".into()));
        }
        if candidate_times.is_empty() || candidate_times.len() > Self::MAX_CANDIDATES {
            return Err(HiveError::InvalidInput(format!(
                "an event needs 1 to {} candidate times, got {}",
                Self::MAX_CANDIDATES,
                candidate_times.len()
            )));
        }
        let distinct: HashSet<&DateTime<Utc>> = candidate_times.iter().collect();
        if distinct.len() != candidate_times.len() {
            return Err(HiveError::InvalidInput("candidate times must be distinct".into()));
        }

        Ok(Self {
            id: EventId::generate(),
            hive_id: request.hive_id,
            title: request.title.trim().to_string(),
            description: request.description,
            location: request.location,
            candidate_times,
            votes: VoteRegistry::new(),
            status: EventStatus::Proposed,
            confirmed_time: None,
            created_by: request.created_by,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn candidate_times(&self) -> &[DateTime<Utc>] {
        &self.candidate_times
    }

    pub fn votes(&self) -> &VoteRegistry {
        &self.votes
    }

    pub(crate) fn votes_mut(&mut self) -> &mut VoteRegistry {
        &mut self.votes
    }

    pub fn status(&self) -> EventStatus {
        self.status
    }

    pub fn confirmed_time(&self) -> Option<DateTime<Utc>> {
        self.confirmed_time
    }

    /// Edits title, description or location. Candidate times, votes and
    /// status cannot be changed this way.
    pub fn edit(&mut self, changes: EventChanges, now: DateTime<Utc>) -> Result<()> {
        if let Some(title) = &changes.title {
            if title.trim().is_empty() {
                return Err(HiveError::InvalidInput("event title cannot be empty".into()));
            }
        }
        if let Some(title) = changes.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        if let Some(location) = changes.location {
            self.location = Some(location);
        }
        self.updated_at = now;
        Ok(())
    }

    /// Applies an evaluation result. Terminal events are left untouched.
    pub(crate) fn apply(&mut self, result: &ConsensusResult) {
        if self.status.is_terminal() {
            return;
        }
        match result.decision {
            ConsensusDecision::Pending => {}
            ConsensusDecision::Confirmed { time } => {
                self.status = EventStatus::Confirmed;
                self.confirmed_time = Some(time);
            }
            ConsensusDecision::Cancelled => {
                self.status = EventStatus::Cancelled;
                self.confirmed_time = None;
            }
        }
    }
}
