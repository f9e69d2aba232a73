//! Members and hives known to the node.

use std::{collections::HashMap, fs, path::Path};

use hive_common::{
    CalendarCredential, Hive, HiveError, HiveId, Member, MemberId, Result,
};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

/// Initial directory contents, read from `directory_path`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorySeed {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub hives: Vec<Hive>,
}

impl DirectorySeed {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

#[derive(Debug, Default)]
pub struct Directory {
    members: RwLock<HashMap<MemberId, Member>>,
    hives: RwLock<HashMap<HiveId, Hive>>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a directory from a seed. Every hive must be valid and only
    /// reference seeded members.
    pub fn from_seed(seed: DirectorySeed) -> Result<Self> {
        let members: HashMap<MemberId, Member> =
            seed.members.into_iter().map(|m| (m.id.clone(), m)).collect();

        let mut hives = HashMap::new();
        for hive in seed.hives {
            hive.validate()?;
            if let Some(unknown) = hive.members.iter().find(|m| !members.contains_key(*m)) {
                return Err(HiveError::NotFound(format!(
                    "member {} of hive {}",
                    unknown, hive.id
                )));
            }
            hives.insert(hive.id.clone(), hive);
        }

        info!(
            "📇 Directory seeded with {} member(s) and {} hive(s)",
            members.len(),
            hives.len()
        );
        Ok(Self {
            members: RwLock::new(members),
            hives: RwLock::new(hives),
        })
    }

    pub async fn add_member(&self, member: Member) -> Result<Member> {
        let mut members = self.members.write().await;
        if members.contains_key(&member.id) {
            return Err(HiveError::InvalidInput(format!(
                "member {} already exists",
                member.id
            )));
        }
        members.insert(member.id.clone(), member.clone());
        Ok(member)
    }

    pub async fn member(&self, id: &MemberId) -> Result<Member> {
        self.members
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| HiveError::NotFound(format!("member {}", id)))
    }

    /// Looks up every id; fails on the first unknown one.
    pub async fn members(&self, ids: &[MemberId]) -> Result<Vec<Member>> {
        let members = self.members.read().await;
        ids.iter()
            .map(|id| {
                members
                    .get(id)
                    .cloned()
                    .ok_or_else(|| HiveError::NotFound(format!("member {}", id)))
            })
            .collect()
    }

    pub async fn set_calendar(
        &self,
        id: &MemberId,
        credential: CalendarCredential,
    ) -> Result<Member> {
        let mut members = self.members.write().await;
        let member = members
            .get_mut(id)
            .ok_or_else(|| HiveError::NotFound(format!("member {}", id)))?;
        member.calendar = Some(credential);
        Ok(member.clone())
    }

    pub async fn add_hive(&self, hive: Hive) -> Result<Hive> {
        hive.validate()?;
        self.members(&hive.members).await?;
        self.hives.write().await.insert(hive.id.clone(), hive.clone());
        Ok(hive)
    }

    pub async fn hive(&self, id: &HiveId) -> Result<Hive> {
        self.hives
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| HiveError::NotFound(format!("hive {}", id)))
    }

    /// Hives `member` belongs to, sorted by name.
    pub async fn hives_of(&self, member: &MemberId) -> Vec<Hive> {
        let mut hives: Vec<Hive> = self
            .hives
            .read()
            .await
            .values()
            .filter(|h| h.is_member(member))
            .cloned()
            .collect();
        hives.sort_by(|a, b| a.name.cmp(&b.name));
        hives
    }

    /// Applies `change` to a copy of the hive and stores it if the result is
    /// still a valid hive whose members are all known.
    pub async fn update_hive<F>(&self, id: &HiveId, change: F) -> Result<Hive>
    where
        F: FnOnce(&mut Hive) -> Result<()>,
    {
        let mut hives = self.hives.write().await;
        let current = hives
            .get(id)
            .ok_or_else(|| HiveError::NotFound(format!("hive {}", id)))?;

        let mut updated = current.clone();
        change(&mut updated)?;
        updated.validate()?;
        self.members(&updated.members).await?;

        hives.insert(id.clone(), updated.clone());
        Ok(updated)
    }
}
