use chrono::{DateTime, Utc};
use hive_common::{HiveError, MemberId, Result, SwipeDirection};
use serde::Deserialize;

use crate::consensus::evaluator::{ConsensusEvaluator, ConsensusResult};
use crate::event::ProposedEvent;

/// A member's swipe on an event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ballot {
    pub member_id: MemberId,
    pub swipe_direction: SwipeDirection,
    #[serde(default)]
    pub response_time: u64,
}

impl Ballot {
    pub fn new(member_id: impl Into<MemberId>, swipe_direction: SwipeDirection) -> Self {
        Self {
            member_id: member_id.into(),
            swipe_direction,
            response_time: 0,
        }
    }
}

/// Records `ballot` on `event` and re-evaluates it against `roster`.
///
/// A member may change their vote while the event is `proposed`; the new
/// vote replaces the old one. Events in a terminal state reject further
/// votes. Nothing is mutated when the roster is empty or the event is closed.
pub fn submit_vote(
    event: &mut ProposedEvent,
    ballot: Ballot,
    roster: &[MemberId],
    evaluator: &ConsensusEvaluator,
    now: DateTime<Utc>,
) -> Result<ConsensusResult> {
    if event.status().is_terminal() {
        return Err(HiveError::EventFinalized(event.id.to_string()));
    }
    if roster.is_empty() {
        return Err(HiveError::EmptyRoster);
    }

    event.votes_mut().register_vote(
        ballot.member_id,
        ballot.swipe_direction,
        ballot.response_time,
        now,
    );
    event.updated_at = now;

    let result = evaluator.evaluate(event, roster)?;
    event.apply(&result);
    Ok(result)
}
