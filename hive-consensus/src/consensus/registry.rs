use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use hive_common::{MemberId, SwipeDirection, Vote};
use serde::{Deserialize, Serialize};

/// One member's latest swipe on an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeLog {
    pub member_id: MemberId,
    pub swipe_direction: SwipeDirection,
    /// Time the member took to answer, in milliseconds.
    #[serde(default)]
    pub response_time: u64,
    pub timestamp: DateTime<Utc>,
}

/// Votes cast on a single event.
///
/// At most one vote and one swipe log per member: a new swipe replaces the
/// previous one.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRegistry {
    votes: BTreeMap<MemberId, Vote>,
    #[serde(default)]
    swipe_logs: Vec<SwipeLog>,
}

impl VoteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `member`'s swipe, returning the vote it replaced, if any.
    pub fn register_vote(
        &mut self,
        member: MemberId,
        direction: SwipeDirection,
        response_time: u64,
        at: DateTime<Utc>,
    ) -> Option<Vote> {
        self.swipe_logs.retain(|log| log.member_id != member);
        self.swipe_logs.push(SwipeLog {
            member_id: member.clone(),
            swipe_direction: direction,
            response_time,
            timestamp: at,
        });
        self.votes.insert(member, Vote::from(direction))
    }

    pub fn get(&self, member: &MemberId) -> Option<Vote> {
        self.votes.get(member).copied()
    }

    pub fn has_voted(&self, member: &MemberId) -> bool {
        self.votes.contains_key(member)
    }

    /// Number of `vote`s cast by members of `roster`.
    pub fn count_among(&self, roster: &HashSet<&MemberId>, vote: Vote) -> usize {
        self.votes
            .iter()
            .filter(|(member, v)| **v == vote && roster.contains(member))
            .count()
    }

    pub fn count(&self, vote: Vote) -> usize {
        self.votes.values().filter(|v| **v == vote).count()
    }

    pub fn all_voted<'a>(&self, roster: impl IntoIterator<Item = &'a MemberId>) -> bool {
        roster.into_iter().all(|m| self.votes.contains_key(m))
    }

    pub fn votes(&self) -> &BTreeMap<MemberId, Vote> {
        &self.votes
    }

    pub fn swipe_logs(&self) -> &[SwipeLog] {
        &self.swipe_logs
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}
