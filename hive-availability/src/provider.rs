use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hive_common::{BusyInterval, CalendarCredential, HiveError, Result, TimeWindow};

/// Port to an external calendar service.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Busy intervals of the calendar behind `credential` within `window`.
    async fn busy_intervals(
        &self,
        credential: &CalendarCredential,
        window: &TimeWindow,
    ) -> Result<Vec<BusyInterval>>;
}

#[derive(Clone)]
enum Behaviour {
    Busy(Vec<BusyInterval>),
    Fail(String),
}

/// Calendar kept in memory, keyed by credential.
///
/// Unknown credentials fail like a revoked token would. Failures and
/// latency can be injected per credential.
#[derive(Clone, Default)]
pub struct InMemoryCalendar {
    calendars: Arc<Mutex<HashMap<String, Behaviour>>>,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
}

impl InMemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_busy(&self, refresh_token: &str, busy: Vec<BusyInterval>) {
        if let Ok(mut calendars) = self.calendars.lock() {
            calendars.insert(refresh_token.to_string(), Behaviour::Busy(busy));
        }
    }

    pub fn set_failure(&self, refresh_token: &str, reason: &str) {
        if let Ok(mut calendars) = self.calendars.lock() {
            calendars.insert(refresh_token.to_string(), Behaviour::Fail(reason.to_string()));
        }
    }

    pub fn set_delay(&self, refresh_token: &str, delay: Duration) {
        if let Ok(mut delays) = self.delays.lock() {
            delays.insert(refresh_token.to_string(), delay);
        }
    }

    fn lookup(&self, token: &str) -> (Option<Behaviour>, Option<Duration>) {
        let behaviour = self.calendars.lock().ok().and_then(|c| c.get(token).cloned());
        let delay = self.delays.lock().ok().and_then(|d| d.get(token).copied());
        (behaviour, delay)
    }
}

#[async_trait]
impl CalendarProvider for InMemoryCalendar {
    async fn busy_intervals(
        &self,
        credential: &CalendarCredential,
        window: &TimeWindow,
    ) -> Result<Vec<BusyInterval>> {
        let (behaviour, delay) = self.lookup(&credential.0);

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match behaviour {
            Some(Behaviour::Busy(busy)) => Ok(busy
                .into_iter()
                .filter(|b| b.start < window.end && window.start < b.end)
                .collect()),
            Some(Behaviour::Fail(reason)) => Err(HiveError::Calendar(reason)),
            None => Err(HiveError::Calendar("unknown calendar credential".into())),
        }
    }
}
