use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, Offset, Utc};
use futures::future::join_all;
use hive_common::{
    utils::time::{at_local_hour, local_date},
    ActivityFrequency, BusyInterval, FreeSlot, HiveError, Member, MemberId, Result, TimeWindow,
};
use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::{candidates::propose_candidate_times, provider::CalendarProvider, slots};

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Upper bound for a single member's calendar fetch.
    pub fetch_timeout: Duration,
    /// Length of the default proposal window.
    pub window_days: i64,
    /// Local hour the default window opens at.
    pub window_start_hour: u32,
    pub offset: FixedOffset,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(5),
            window_days: 14,
            window_start_hour: 9,
            offset: Utc.fix(),
        }
    }
}

/// Longest window the aggregator works over, in days.
pub const MAX_WINDOW_DAYS: i64 = 365;

/// Calendar data of one member that could be read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberAvailability {
    pub member: MemberId,
    pub busy: Vec<BusyInterval>,
    pub free_slots: Vec<FreeSlot>,
}

/// Fans calendar reads out over the members of a group and reduces them to
/// free slots and candidate times.
///
/// Without a provider no calendar is read and every member counts as having
/// no calendar access.
#[derive(Clone)]
pub struct AvailabilityAggregator {
    provider: Option<Arc<dyn CalendarProvider>>,
    config: AggregatorConfig,
}

impl AvailabilityAggregator {
    pub fn new(provider: Arc<dyn CalendarProvider>, config: AggregatorConfig) -> Self {
        Self {
            provider: Some(provider),
            config,
        }
    }

    /// An aggregator that never reads calendars; proposals always use the
    /// default schedule.
    pub fn offline(config: AggregatorConfig) -> Self {
        Self {
            provider: None,
            config,
        }
    }

    pub fn is_offline(&self) -> bool {
        self.provider.is_none()
    }

    /// Fails unless `window` spans at most [`MAX_WINDOW_DAYS`].
    pub fn check_window(&self, window: &TimeWindow) -> Result<()> {
        if window.duration() > ChronoDuration::days(MAX_WINDOW_DAYS) {
            return Err(HiveError::InvalidInput(format!(
                "availability window is limited to {} days",
                MAX_WINDOW_DAYS
            )));
        }
        Ok(())
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Window used when the caller gives none: from the configured local
    /// hour today through `window_days` later.
    pub fn default_window(&self, now: DateTime<Utc>) -> Result<TimeWindow> {
        let today = local_date(now, &self.config.offset);
        let start = at_local_hour(today, self.config.window_start_hour, &self.config.offset)
            .ok_or_else(|| {
                HiveError::Config(format!(
                    "invalid window start hour {}",
                    self.config.window_start_hour
                ))
            })?;
        let days = self.config.window_days;
        if !(1..=MAX_WINDOW_DAYS).contains(&days) {
            return Err(HiveError::Config(format!(
                "window_days must be between 1 and {}, got {}",
                MAX_WINDOW_DAYS, days
            )));
        }
        let end = ChronoDuration::try_days(days)
            .and_then(|span| start.checked_add_signed(span))
            .ok_or_else(|| HiveError::Config(format!("window of {} days overflows", days)))?;
        TimeWindow::new(start, end)
    }

    /// Reads every member's calendar concurrently.
    ///
    /// Members without a credential are skipped. Failures and timeouts are
    /// logged and the member is left out; this never fails as a whole.
    pub async fn collect(
        &self,
        members: &[Member],
        window: &TimeWindow,
    ) -> Vec<MemberAvailability> {
        let Some(provider) = &self.provider else {
            debug!("📴 Calendar reads disabled; skipping {} member(s)", members.len());
            return Vec::new();
        };

        let fetches = members
            .iter()
            .filter_map(|m| m.calendar.as_ref().map(|cred| (m, cred)))
            .map(|(member, credential)| async move {
                let fetched = timeout(
                    self.config.fetch_timeout,
                    provider.busy_intervals(credential, window),
                )
                .await;

                match fetched {
                    Ok(Ok(busy)) => {
                        let free_slots = slots::compute_free_slots(&busy, window);
                        Some(MemberAvailability {
                            member: member.id.clone(),
                            busy,
                            free_slots,
                        })
                    }
                    Ok(Err(e)) => {
                        warn!("⚠️ Calendar read failed for member [{}]: {}", member.id, e);
                        None
                    }
                    Err(_) => {
                        warn!(
                            "⏰ Calendar read for member [{}] took longer than {:?}",
                            member.id, self.config.fetch_timeout
                        );
                        None
                    }
                }
            });

        let results: Vec<MemberAvailability> =
            join_all(fetches).await.into_iter().flatten().collect();

        info!(
            "📅 Availability collected for {}/{} members",
            results.len(),
            members.len()
        );
        results
    }

    /// Free slots shared by every member whose calendar could be read.
    pub async fn common_free_slots(
        &self,
        members: &[Member],
        window: &TimeWindow,
    ) -> Vec<FreeSlot> {
        let availability = self.collect(members, window).await;
        let per_member: Vec<Vec<FreeSlot>> =
            availability.into_iter().map(|a| a.free_slots).collect();
        slots::common_free_slots(&per_member)
    }

    /// 1..=3 candidate times for a new event.
    pub async fn propose(
        &self,
        members: &[Member],
        window: &TimeWindow,
        frequency: ActivityFrequency,
        now: DateTime<Utc>,
    ) -> Vec<DateTime<Utc>> {
        let availability = self.collect(members, window).await;
        let per_member: Vec<Vec<FreeSlot>> =
            availability.into_iter().map(|a| a.free_slots).collect();

        let offset = &self.config.offset;
        let picked = propose_candidate_times(&per_member, window, frequency, now, offset);
        info!(
            "🐝 Proposed {} candidate time(s) from {} calendar(s)",
            picked.len(),
            per_member.len()
        );
        picked
    }
}
