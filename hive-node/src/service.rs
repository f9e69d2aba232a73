//! Orchestration of directory, availability and consensus.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hive_availability::{common_free_slots, AvailabilityAggregator, MemberAvailability};
use hive_common::{
    utils::time::current_time, ActivityFrequency, CalendarCredential, EventId, FreeSlot, Hive,
    HiveError, HiveId, HiveSettings, Member, MemberId, Result, TimeWindow,
};
use hive_consensus::{
    Ballot, ConsensusEngine, ConsensusResult, EventChanges, NewEvent, ProposedEvent,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::directory::Directory;

#[derive(Debug, Clone, Deserialize)]
pub struct NewMember {
    pub id: MemberId,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHive {
    pub name: String,
    pub members: Vec<MemberId>,
    #[serde(default)]
    pub activity_frequency: ActivityFrequency,
    #[serde(default)]
    pub settings: HiveSettings,
}

/// Changes to a hive's details, requested by one of its members.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiveUpdate {
    pub member_id: MemberId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub activity_frequency: Option<ActivityFrequency>,
    #[serde(default)]
    pub settings: Option<HiveSettings>,
}

/// A member adding someone else to a hive.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiveInvite {
    pub member_id: MemberId,
    pub new_member_id: MemberId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    pub member_id: MemberId,
    #[serde(flatten)]
    pub changes: EventChanges,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveOutcome {
    pub hive: Hive,
    /// Open events that settled against the smaller roster.
    pub settled_events: Vec<ProposedEvent>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityReport {
    pub hive_id: HiveId,
    pub window: TimeWindow,
    /// Members whose calendar could be read.
    pub members: Vec<MemberAvailability>,
    pub common_free_slots: Vec<FreeSlot>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeOutcome {
    pub event: ProposedEvent,
    pub consensus: ConsensusResult,
}

pub struct HiveService {
    pub directory: Arc<Directory>,
    pub aggregator: AvailabilityAggregator,
    pub engine: ConsensusEngine,
    clock: fn() -> DateTime<Utc>,
}

impl HiveService {
    pub fn new(
        directory: Arc<Directory>,
        aggregator: AvailabilityAggregator,
        engine: ConsensusEngine,
    ) -> Self {
        Self {
            directory,
            aggregator,
            engine,
            clock: current_time,
        }
    }

    /// Replaces the wall clock, e.g. to pin "now" in tests.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub async fn register_member(&self, request: NewMember) -> Result<Member> {
        if request.id.0.trim().is_empty() {
            return Err(HiveError::InvalidInput("member id is required".into()));
        }
        let member = self
            .directory
            .add_member(Member::new(request.id, request.name))
            .await?;
        info!("👤 Member [{}] registered", member.id);
        Ok(member)
    }

    pub async fn link_calendar(
        &self,
        member: &MemberId,
        refresh_token: String,
    ) -> Result<Member> {
        if refresh_token.trim().is_empty() {
            return Err(HiveError::InvalidInput("refresh token is required".into()));
        }
        let member = self
            .directory
            .set_calendar(member, CalendarCredential(refresh_token))
            .await?;
        info!("🔗 Calendar linked for member [{}]", member.id);
        Ok(member)
    }

    pub async fn create_hive(&self, request: NewHive) -> Result<Hive> {
        let hive = Hive::new(
            request.name,
            request.members,
            request.activity_frequency,
            request.settings,
        )?;
        let hive = self.directory.add_hive(hive).await?;
        info!(
            "🐝 Hive [{}] '{}' created with {} members",
            hive.id,
            hive.name,
            hive.members.len()
        );
        Ok(hive)
    }

    pub async fn hive(&self, id: &HiveId) -> Result<Hive> {
        self.directory.hive(id).await
    }

    pub async fn list_hives(&self, member: &MemberId) -> Result<Vec<Hive>> {
        self.directory.member(member).await?;
        Ok(self.directory.hives_of(member).await)
    }

    /// Edits name, frequency or settings. The roster is changed through
    /// [`HiveService::add_hive_member`] and [`HiveService::leave_hive`].
    pub async fn update_hive(&self, hive_id: &HiveId, update: HiveUpdate) -> Result<Hive> {
        let hive = self
            .directory
            .update_hive(hive_id, |hive| {
                hive.ensure_member(&update.member_id)?;
                if let Some(name) = update.name {
                    hive.name = name.trim().to_string();
                }
                if let Some(frequency) = update.activity_frequency {
                    hive.activity_frequency = frequency;
                }
                if let Some(settings) = update.settings {
                    hive.settings = settings;
                }
                Ok(())
            })
            .await?;
        info!("🐝 Hive [{}] updated by [{}]", hive.id, update.member_id);
        Ok(hive)
    }

    /// Adds `new_member_id` to the roster. The requester must already belong
    /// to the hive.
    pub async fn add_hive_member(&self, hive_id: &HiveId, invite: HiveInvite) -> Result<Hive> {
        self.directory.member(&invite.new_member_id).await?;
        let hive = self
            .directory
            .update_hive(hive_id, |hive| {
                hive.ensure_member(&invite.member_id)?;
                if hive.is_member(&invite.new_member_id) {
                    return Err(HiveError::InvalidInput(format!(
                        "member {} already in hive {}",
                        invite.new_member_id, hive.id
                    )));
                }
                hive.members.push(invite.new_member_id.clone());
                Ok(())
            })
            .await?;
        info!(
            "➕ Member [{}] joined hive [{}] ({} members)",
            invite.new_member_id,
            hive.id,
            hive.members.len()
        );
        Ok(hive)
    }

    /// Removes `member` from the roster and settles open events whose
    /// outcome is now decided by the remaining members.
    pub async fn leave_hive(&self, hive_id: &HiveId, member: &MemberId) -> Result<LeaveOutcome> {
        let hive = self
            .directory
            .update_hive(hive_id, |hive| {
                if !hive.is_member(member) {
                    return Err(HiveError::InvalidInput(format!(
                        "member {} is not in hive {}",
                        member, hive.id
                    )));
                }
                hive.members.retain(|m| m != member);
                Ok(())
            })
            .await?;
        info!(
            "➖ Member [{}] left hive [{}] ({} members)",
            member,
            hive.id,
            hive.members.len()
        );

        let settled_events = self.engine.reevaluate_hive(&hive, self.now()).await?;
        Ok(LeaveOutcome {
            hive,
            settled_events,
        })
    }

    /// Per-member and common free time over `window`, or over the default
    /// window when none is given.
    pub async fn availability(
        &self,
        hive_id: &HiveId,
        window: Option<TimeWindow>,
    ) -> Result<AvailabilityReport> {
        let hive = self.directory.hive(hive_id).await?;
        let members = self.directory.members(&hive.members).await?;
        let window = match window {
            Some(window) => {
                self.aggregator.check_window(&window)?;
                window
            }
            None => self.aggregator.default_window(self.now())?,
        };

        let availability = self.aggregator.collect(&members, &window).await;
        let per_member: Vec<Vec<FreeSlot>> =
            availability.iter().map(|a| a.free_slots.clone()).collect();

        Ok(AvailabilityReport {
            hive_id: hive.id,
            window,
            common_free_slots: common_free_slots(&per_member),
            members: availability,
        })
    }

    /// Proposes candidate times for the hive and stores the event as `proposed`.
    pub async fn create_event(&self, request: NewEvent) -> Result<ProposedEvent> {
        let hive = self.directory.hive(&request.hive_id).await?;
        hive.ensure_member(&request.created_by)?;
        if request.title.trim().is_empty() {
            return Err(HiveError::InvalidInput("event title is required".into()));
        }

        let members = self.directory.members(&hive.members).await?;
        let now = self.now();
        let window = self.aggregator.default_window(now)?;
        let candidates = self
            .aggregator
            .propose(&members, &window, hive.activity_frequency, now)
            .await;

        self.engine.create_event(request, candidates, now).await
    }

    pub async fn event(&self, id: &EventId) -> Result<ProposedEvent> {
        self.engine.get_event(id).await
    }

    pub async fn hive_events(&self, hive_id: &HiveId) -> Result<Vec<ProposedEvent>> {
        let hive = self.directory.hive(hive_id).await?;
        Ok(self.engine.pool.by_hive(&hive.id).await)
    }

    /// Records a swipe. Only members of the event's hive may vote.
    pub async fn swipe(&self, event_id: &EventId, ballot: Ballot) -> Result<SwipeOutcome> {
        let event = self.engine.get_event(event_id).await?;
        let hive = self.directory.hive(&event.hive_id).await?;
        hive.ensure_member(&ballot.member_id)?;

        let (event, consensus) = self
            .engine
            .submit_vote(&hive, event_id, ballot, self.now())
            .await?;
        Ok(SwipeOutcome { event, consensus })
    }

    /// Edits title, description or location. The creator or any member of
    /// the event's hive may do so.
    pub async fn update_event(
        &self,
        event_id: &EventId,
        update: EventUpdate,
    ) -> Result<ProposedEvent> {
        let event = self.engine.get_event(event_id).await?;
        if event.created_by != update.member_id {
            let hive = self.directory.hive(&event.hive_id).await?;
            hive.ensure_member(&update.member_id)?;
        }
        self.engine
            .update_event(event_id, update.changes, self.now())
            .await
    }

    /// Deletes an event; only its creator may do so.
    pub async fn delete_event(
        &self,
        event_id: &EventId,
        requester: &MemberId,
    ) -> Result<ProposedEvent> {
        let event = self.engine.get_event(event_id).await?;
        if &event.created_by != requester {
            return Err(HiveError::Forbidden(format!(
                "only {} may delete event {}",
                event.created_by, event_id
            )));
        }
        self.engine.remove_event(event_id).await
    }
}
