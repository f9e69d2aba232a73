use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use hive_common::{EventId, Hive, HiveError, HiveId, Member, MemberId, TimeWindow};
use hive_consensus::{Ballot, NewEvent, ProposedEvent};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::info;

use super::error::ApiError;
use crate::service::{
    AvailabilityReport, EventUpdate, HiveInvite, HiveService, HiveUpdate, LeaveOutcome, NewHive,
    NewMember, SwipeOutcome,
};

type ApiResult<T> = Result<T, ApiError>;

#[derive(Clone)]
pub struct AppState {
    pub name: String,
    pub service: Arc<HiveService>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarLink {
    refresh_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberParams {
    member_id: MemberId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WindowParams {
    #[serde(default)]
    window_start: Option<DateTime<Utc>>,
    #[serde(default)]
    window_end: Option<DateTime<Utc>>,
}

impl WindowParams {
    /// Both bounds or neither; `None` selects the default window.
    fn into_window(self) -> Result<Option<TimeWindow>, HiveError> {
        match (self.window_start, self.window_end) {
            (Some(start), Some(end)) => TimeWindow::new(start, end).map(Some),
            (None, None) => Ok(None),
            _ => Err(HiveError::InvalidInput(
                "windowStart and windowEnd must be given together".into(),
            )),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    name: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/members", post(register_member))
        .route("/api/members/{id}/calendar", put(link_calendar))
        .route("/api/hives", get(list_hives).post(create_hive))
        .route("/api/hives/{id}", get(get_hive).put(update_hive))
        .route("/api/hives/{id}/members", post(add_hive_member))
        .route("/api/hives/{id}/members/{member_id}", delete(leave_hive))
        .route("/api/hives/{id}/events", get(list_hive_events))
        .route("/api/hives/{id}/availability", get(hive_availability))
        .route("/api/events", post(create_event))
        .route(
            "/api/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/api/events/{id}/swipe", post(swipe))
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
}

/// Serves the API on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("REST API listening on {}", addr);
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok", name: state.name })
}

async fn register_member(
    State(state): State<AppState>,
    Json(request): Json<NewMember>,
) -> ApiResult<(StatusCode, Json<Member>)> {
    let member = state.service.register_member(request).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

async fn link_calendar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(link): Json<CalendarLink>,
) -> ApiResult<Json<Member>> {
    let member = state
        .service
        .link_calendar(&MemberId(id), link.refresh_token)
        .await?;
    Ok(Json(member))
}

async fn create_hive(
    State(state): State<AppState>,
    Json(request): Json<NewHive>,
) -> ApiResult<(StatusCode, Json<Hive>)> {
    let hive = state.service.create_hive(request).await?;
    Ok((StatusCode::CREATED, Json(hive)))
}

async fn list_hives(
    State(state): State<AppState>,
    Query(params): Query<MemberParams>,
) -> ApiResult<Json<Vec<Hive>>> {
    Ok(Json(state.service.list_hives(&params.member_id).await?))
}

async fn get_hive(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Hive>> {
    Ok(Json(state.service.hive(&HiveId(id)).await?))
}

async fn update_hive(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<HiveUpdate>,
) -> ApiResult<Json<Hive>> {
    Ok(Json(state.service.update_hive(&HiveId(id), update).await?))
}

async fn add_hive_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(invite): Json<HiveInvite>,
) -> ApiResult<Json<Hive>> {
    Ok(Json(state.service.add_hive_member(&HiveId(id), invite).await?))
}

async fn leave_hive(
    State(state): State<AppState>,
    Path((id, member_id)): Path<(String, String)>,
) -> ApiResult<Json<LeaveOutcome>> {
    let outcome = state
        .service
        .leave_hive(&HiveId(id), &MemberId(member_id))
        .await?;
    Ok(Json(outcome))
}

async fn list_hive_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<ProposedEvent>>> {
    Ok(Json(state.service.hive_events(&HiveId(id)).await?))
}

async fn hive_availability(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<WindowParams>,
) -> ApiResult<Json<AvailabilityReport>> {
    let window = params.into_window()?;
    Ok(Json(state.service.availability(&HiveId(id), window).await?))
}

async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<NewEvent>,
) -> ApiResult<(StatusCode, Json<ProposedEvent>)> {
    let event = state.service.create_event(request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProposedEvent>> {
    Ok(Json(state.service.event(&EventId(id)).await?))
}

async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<EventUpdate>,
) -> ApiResult<Json<ProposedEvent>> {
    Ok(Json(state.service.update_event(&EventId(id), update).await?))
}

async fn swipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(ballot): Json<Ballot>,
) -> ApiResult<Json<SwipeOutcome>> {
    Ok(Json(state.service.swipe(&EventId(id), ballot).await?))
}

async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<MemberParams>,
) -> ApiResult<Json<ProposedEvent>> {
    let removed = state
        .service
        .delete_event(&EventId(id), &params.member_id)
        .await?;
    Ok(Json(removed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(query: &str) -> WindowParams {
        let uri: axum::http::Uri = format!("/availability?{query}").parse().unwrap();
        Query::<WindowParams>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_window_params_need_both_bounds() {
        let none = params("").into_window().unwrap();
        assert!(none.is_none());

        let both = params("windowStart=2025-03-08T10:00:00Z&windowEnd=2025-03-09T10:00:00Z")
            .into_window()
            .unwrap()
            .unwrap();
        assert_eq!(both.end - both.start, chrono::Duration::days(1));

        let only_end = params("windowEnd=2025-03-09T10:00:00Z").into_window();
        assert!(matches!(only_end, Err(HiveError::InvalidInput(_))));

        let reversed = params("windowStart=2025-03-09T10:00:00Z&windowEnd=2025-03-08T10:00:00Z")
            .into_window();
        assert!(matches!(reversed, Err(HiveError::InvalidInput(_))));
    }
}
