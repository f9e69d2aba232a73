use std::collections::HashSet;

use chrono::{DateTime, Utc};
use hive_common::{EventId, HiveError, MemberId, Result, Vote};
use serde::Serialize;
use tracing::debug;

use crate::event::ProposedEvent;

/// Share of the roster that must accept for an event to be confirmed.
/// Exactly half confirms.
pub const ACCEPTANCE_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum ConsensusDecision {
    /// Not every roster member has voted yet.
    Pending,
    Confirmed { time: DateTime<Utc> },
    Cancelled,
}

/// Outcome of evaluating one event against its roster.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusResult {
    pub event_id: EventId,
    #[serde(flatten)]
    pub decision: ConsensusDecision,
    pub accepted: usize,
    pub declined: usize,
    pub roster_size: usize,
    /// Only defined once the whole roster has voted.
    pub acceptance_rate: Option<f64>,
}

/// Decides event status from votes and roster.
///
/// Hive settings such as `requireAllAccept` are stored with the hive but do
/// not change the rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsensusEvaluator;

impl ConsensusEvaluator {
    /// Evaluates `event` against the authoritative `roster`.
    ///
    /// Pure and deterministic: the same votes and roster always give the same
    /// decision. Votes from ids outside the roster are ignored. The confirmed
    /// time is always the first candidate time.
    pub fn evaluate(&self, event: &ProposedEvent, roster: &[MemberId]) -> Result<ConsensusResult> {
        let roster: HashSet<&MemberId> = roster.iter().collect();
        if roster.is_empty() {
            return Err(HiveError::EmptyRoster);
        }

        let votes = event.votes();
        let accepted = votes.count_among(&roster, Vote::Accept);
        let declined = votes.count_among(&roster, Vote::Decline);
        let roster_size = roster.len();

        if !votes.all_voted(roster.iter().copied()) {
            return Ok(ConsensusResult {
                event_id: event.id.clone(),
                decision: ConsensusDecision::Pending,
                accepted,
                declined,
                roster_size,
                acceptance_rate: None,
            });
        }

        let acceptance_rate = accepted as f64 / roster_size as f64;
        let decision = if acceptance_rate >= ACCEPTANCE_THRESHOLD {
            match event.candidate_times().first() {
                Some(time) => ConsensusDecision::Confirmed { time: *time },
                None => ConsensusDecision::Cancelled,
            }
        } else {
            ConsensusDecision::Cancelled
        };

        debug!(
            "🗳️ Event [{}]: {}/{} accepted ({:.3}) vs threshold {:.3}",
            event.id,
            accepted,
            roster_size,
            acceptance_rate,
            ACCEPTANCE_THRESHOLD
        );

        Ok(ConsensusResult {
            event_id: event.id.clone(),
            decision,
            accepted,
            declined,
            roster_size,
            acceptance_rate: Some(acceptance_rate),
        })
    }
}
