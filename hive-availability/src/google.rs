//! Google Calendar free/busy client.

use std::collections::HashMap;

use async_trait::async_trait;
use hive_common::{BusyInterval, CalendarCredential, HiveError, Result, TimeWindow};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::provider::CalendarProvider;

const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_API_BASE: &str = "https://www.googleapis.com";
const PRIMARY: &str = "primary";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleCalendarConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for GoogleCalendarConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            token_url: default_token_url(),
            api_base: default_api_base(),
        }
    }
}

impl GoogleCalendarConfig {
    /// `GOOGLE_CLIENT_ID` and `GOOGLE_CLIENT_SECRET` take precedence over the file.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(id) = std::env::var("GOOGLE_CLIENT_ID") {
            self.client_id = id;
        }
        if let Ok(secret) = std::env::var("GOOGLE_CLIENT_SECRET") {
            self.client_secret = secret;
        }
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct FreeBusyResponse {
    #[serde(default)]
    calendars: HashMap<String, FreeBusyCalendar>,
}

#[derive(Deserialize)]
struct FreeBusyCalendar {
    #[serde(default)]
    busy: Vec<BusyInterval>,
    #[serde(default)]
    errors: Vec<FreeBusyError>,
}

#[derive(Deserialize)]
struct FreeBusyError {
    #[serde(default)]
    reason: String,
}

/// Reads busy intervals of a member's primary Google calendar.
///
/// Each call trades the member's refresh token for a short-lived access
/// token; nothing is cached between calls.
#[derive(Clone)]
pub struct GoogleCalendarProvider {
    http: reqwest::Client,
    config: GoogleCalendarConfig,
}

impl GoogleCalendarProvider {
    pub fn new(config: GoogleCalendarConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    async fn access_token(&self, credential: &CalendarCredential) -> Result<String> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", credential.0.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| HiveError::Calendar(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(HiveError::Calendar(format!(
                "token endpoint answered {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| HiveError::Calendar(format!("decode token: {e}")))?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarProvider {
    async fn busy_intervals(
        &self,
        credential: &CalendarCredential,
        window: &TimeWindow,
    ) -> Result<Vec<BusyInterval>> {
        let access_token = self.access_token(credential).await?;

        let body = json!({
            "timeMin": window.start.to_rfc3339(),
            "timeMax": window.end.to_rfc3339(),
            "items": [{ "id": PRIMARY }],
        });

        let url = format!("{}/calendar/v3/freeBusy", self.config.api_base.trim_end_matches('/'));
        let response = self
            .http
            .post(url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| HiveError::Calendar(format!("freeBusy request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(HiveError::Calendar(format!(
                "freeBusy answered {}",
                response.status()
            )));
        }

        let parsed: FreeBusyResponse = response
            .json()
            .await
            .map_err(|e| HiveError::Calendar(format!("decode freeBusy: {e}")))?;

        parse_primary(parsed)
    }
}

fn parse_primary(mut parsed: FreeBusyResponse) -> Result<Vec<BusyInterval>> {
    let Some(primary) = parsed.calendars.remove(PRIMARY) else {
        return Ok(Vec::new());
    };
    if let Some(err) = primary.errors.first() {
        return Err(HiveError::Calendar(format!("primary calendar: {}", err.reason)));
    }
    debug!("📅 freeBusy returned {} busy intervals", primary.busy.len());
    Ok(primary.busy)
}
