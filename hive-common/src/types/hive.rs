//! Hive (group) records.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HiveError, Result};
use crate::types::member::MemberId;

#[derive(Default, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HiveId(pub String);

impl HiveId {
    pub fn generate() -> Self {
        HiveId(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for HiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HiveId {
    fn from(s: &str) -> Self {
        HiveId(s.to_string())
    }
}

/// How often a hive expects to meet. Drives the fallback schedule when no
/// calendar data is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityFrequency {
    Daily,
    #[default]
    Weekly,
    Biweekly,
    Monthly,
    Spontaneous,
}

impl ActivityFrequency {
    /// Days between two consecutive default proposals.
    pub fn interval_days(&self) -> i64 {
        match self {
            ActivityFrequency::Daily => 1,
            ActivityFrequency::Weekly => 7,
            ActivityFrequency::Biweekly => 14,
            ActivityFrequency::Monthly => 30,
            ActivityFrequency::Spontaneous => 3,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiveSettings {
    /// Stored preference only. Confirmation always uses the half-accept rule.
    #[serde(default)]
    pub require_all_accept: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hive {
    pub id: HiveId,
    pub name: String,
    pub members: Vec<MemberId>,
    #[serde(default)]
    pub activity_frequency: ActivityFrequency,
    #[serde(default)]
    pub settings: HiveSettings,
}

impl Hive {
    pub const MIN_MEMBERS: usize = 2;

    /// Builds a hive, enforcing the roster rules (at least two distinct members).
    pub fn new(
        name: impl Into<String>,
        members: Vec<MemberId>,
        activity_frequency: ActivityFrequency,
        settings: HiveSettings,
    ) -> Result<Self> {
        let hive = Self {
            id: HiveId::generate(),
            name: name.into(),
            members,
            activity_frequency,
            settings,
        };
        hive.validate()?;
        Ok(hive)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(HiveError::InvalidInput("hive name is required".into()));
        }
        let distinct: HashSet<&MemberId> = self.members.iter().collect();
        if distinct.len() != self.members.len() {
            return Err(HiveError::InvalidInput(format!(
                "hive {} lists a member twice",
                self.name
            )));
        }
        if self.members.len() < Self::MIN_MEMBERS {
            return Err(HiveError::InvalidInput(format!(
                "hive must have at least {} members",
                Self::MIN_MEMBERS
            )));
        }
        Ok(())
    }

    pub fn is_member(&self, member: &MemberId) -> bool {
        self.members.contains(member)
    }

    /// Fails with [`HiveError::NotMember`] unless `member` is on the roster.
    pub fn ensure_member(&self, member: &MemberId) -> Result<()> {
        if self.is_member(member) {
            Ok(())
        } else {
            Err(HiveError::NotMember {
                member: member.to_string(),
                hive: self.id.to_string(),
            })
        }
    }
}
