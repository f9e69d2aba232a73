use chrono::{DateTime, Utc};
use hive_common::{EventId, EventStatus, Hive, HiveError, Result};
use tracing::{info, warn};

use super::{
    evaluator::{ConsensusEvaluator, ConsensusResult},
    pool::EventPool,
    resolver::{submit_vote, Ballot},
};
use crate::event::{EventChanges, NewEvent, ProposedEvent};

/// Holds proposed events and serialises votes per event.
#[derive(Debug, Clone, Default)]
pub struct ConsensusEngine {
    pub pool: EventPool,
    pub evaluator: ConsensusEvaluator,
}

impl ConsensusEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new `proposed` event with the given candidate times.
    pub async fn create_event(
        &self,
        request: NewEvent,
        candidate_times: Vec<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<ProposedEvent> {
        let event = ProposedEvent::new(request, candidate_times, now)?;
        if !self.pool.add(event.clone()).await {
            return Err(HiveError::InvalidInput(format!("event {} already exists", event.id)));
        }
        info!(
            "📝 Event [{}] '{}' proposed for hive [{}] with {} candidate time(s)",
            event.id,
            event.title,
            event.hive_id,
            event.candidate_times().len()
        );
        tracing::info!(
            target: "consensus",
            "EVENT:PROPOSE event_id={} hive_id={}",
            event.id,
            event.hive_id
        );
        Ok(event)
    }

    /// Records a vote and re-evaluates the event, holding the event's lock
    /// for the whole read-modify-write.
    ///
    /// `hive` must be the owning hive as currently stored; its roster drives
    /// the evaluation. Membership of the voter is checked by the caller.
    pub async fn submit_vote(
        &self,
        hive: &Hive,
        event_id: &EventId,
        ballot: Ballot,
        now: DateTime<Utc>,
    ) -> Result<(ProposedEvent, ConsensusResult)> {
        let handle = self
            .pool
            .handle(event_id)
            .await
            .ok_or_else(|| HiveError::NotFound(format!("event {}", event_id)))?;

        let mut event = handle.lock().await;
        ensure_owned_by(&event, hive)?;

        let member = ballot.member_id.clone();
        let direction = ballot.swipe_direction;
        let before = event.status();

        let result = match submit_vote(&mut event, ballot, &hive.members, &self.evaluator, now) {
            Ok(result) => result,
            Err(e) => {
                warn!("⚠️ Vote by [{}] on event [{}] rejected: {}", member, event_id, e);
                return Err(e);
            }
        };

        info!(
            "📥 [{}] swiped {} on event [{}] ({}/{} voted)",
            member,
            direction,
            event_id,
            event.votes().len(),
            hive.members.len()
        );
        tracing::info!(
            target: "consensus",
            "EVENT:VOTE event_id={} member={} direction={}",
            event_id,
            member,
            direction
        );
        log_transition(&event, before, &result);

        Ok((event.clone(), result))
    }

    /// Re-evaluates every open event of `hive` against its current roster,
    /// e.g. after a member left. Returns the events that reached a terminal
    /// state.
    pub async fn reevaluate_hive(
        &self,
        hive: &Hive,
        now: DateTime<Utc>,
    ) -> Result<Vec<ProposedEvent>> {
        let mut settled = Vec::new();
        for snapshot in self.pool.by_hive(&hive.id).await {
            if snapshot.status().is_terminal() {
                continue;
            }
            let Some(handle) = self.pool.handle(&snapshot.id).await else {
                continue;
            };

            let mut event = handle.lock().await;
            let before = event.status();
            if before.is_terminal() {
                continue;
            }
            let result = self.evaluator.evaluate(&event, &hive.members)?;
            event.apply(&result);

            if event.status() != before {
                event.updated_at = now;
                log_transition(&event, before, &result);
                settled.push(event.clone());
            }
        }
        Ok(settled)
    }

    /// Edits an event's details under its lock.
    pub async fn update_event(
        &self,
        event_id: &EventId,
        changes: EventChanges,
        now: DateTime<Utc>,
    ) -> Result<ProposedEvent> {
        let handle = self
            .pool
            .handle(event_id)
            .await
            .ok_or_else(|| HiveError::NotFound(format!("event {}", event_id)))?;
        let mut event = handle.lock().await;
        event.edit(changes, now)?;
        info!("✏️ Event [{}] updated", event_id);
        Ok(event.clone())
    }

    pub async fn get_event(&self, event_id: &EventId) -> Result<ProposedEvent> {
        self.pool
            .snapshot(event_id)
            .await
            .ok_or_else(|| HiveError::NotFound(format!("event {}", event_id)))
    }

    pub async fn remove_event(&self, event_id: &EventId) -> Result<ProposedEvent> {
        let removed = self
            .pool
            .remove(event_id)
            .await
            .ok_or_else(|| HiveError::NotFound(format!("event {}", event_id)))?;
        info!("🗑️ Event [{}] removed", event_id);
        Ok(removed)
    }
}

fn ensure_owned_by(event: &ProposedEvent, hive: &Hive) -> Result<()> {
    if event.hive_id != hive.id {
        return Err(HiveError::InvalidInput(format!(
            "event {} does not belong to hive {}",
            event.id, hive.id
        )));
    }
    Ok(())
}

fn log_transition(event: &ProposedEvent, before: EventStatus, result: &ConsensusResult) {
    let after = event.status();
    if before == after {
        return;
    }
    match after {
        EventStatus::Confirmed => info!(
            "✅ Event [{}] CONFIRMED for {:?} ({}/{} accepted)",
            event.id,
            event.confirmed_time(),
            result.accepted,
            result.roster_size
        ),
        EventStatus::Cancelled => info!(
            "❌ Event [{}] CANCELLED ({}/{} accepted)",
            event.id, result.accepted, result.roster_size
        ),
        EventStatus::Proposed => {}
    }
    tracing::info!(target: "consensus", "EVENT:TRANSITION event_id={} status={}", event.id, after);
}
