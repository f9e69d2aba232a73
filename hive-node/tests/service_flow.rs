use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use hive_availability::{AggregatorConfig, AvailabilityAggregator, InMemoryCalendar};
use hive_common::{
    ActivityFrequency, BusyInterval, EventId, EventStatus, HiveError, HiveSettings, SwipeDirection,
    TimeWindow,
};
use hive_consensus::{Ballot, ConsensusEngine, EventChanges, Location, NewEvent};
use hive_node::{
    api::rest::{serve, AppState},
    directory::Directory,
    service::{EventUpdate, HiveInvite, HiveUpdate, NewHive, NewMember},
    HiveService,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

// 2025-03-07 is a Friday.
fn friday_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 7, 8, 0, 0).unwrap()
}

fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, hour, minute, 0).unwrap()
}

fn service(calendar: &InMemoryCalendar) -> HiveService {
    let aggregator =
        AvailabilityAggregator::new(Arc::new(calendar.clone()), AggregatorConfig::default());
    HiveService::new(Arc::new(Directory::new()), aggregator, ConsensusEngine::new())
        .with_clock(friday_morning)
}

async fn register(service: &HiveService, ids: &[&str]) {
    for id in ids {
        service
            .register_member(NewMember {
                id: (*id).into(),
                name: id.to_uppercase(),
            })
            .await
            .unwrap();
    }
}

fn new_hive(members: &[&str]) -> NewHive {
    NewHive {
        name: "Board games".into(),
        members: members.iter().map(|m| (*m).into()).collect(),
        activity_frequency: ActivityFrequency::Weekly,
        settings: HiveSettings::default(),
    }
}

async fn swipe(service: &HiveService, event: &EventId, member: &str, dir: SwipeDirection) {
    service.swipe(event, Ballot::new(member, dir)).await.unwrap();
}

fn new_event(hive: &hive_common::Hive, creator: &str) -> NewEvent {
    NewEvent {
        hive_id: hive.id.clone(),
        title: "Catan night".into(),
        description: None,
        location: None,
        created_by: creator.into(),
    }
}

#[tokio::test]
async fn test_event_proposed_from_calendars_and_confirmed() {
    let calendar = InMemoryCalendar::new();
    calendar.set_busy("rt-ana", vec![BusyInterval::new(at(7, 17, 0), at(7, 20, 30))]);

    let service = service(&calendar);
    register(&service, &["ana", "ben", "cy"]).await;
    service.link_calendar(&"ana".into(), "rt-ana".into()).await.unwrap();
    let hive = service.create_hive(new_hive(&["ana", "ben", "cy"])).await.unwrap();

    let event = service.create_event(new_event(&hive, "ana")).await.unwrap();
    assert_eq!(event.status(), EventStatus::Proposed);
    assert_eq!(event.candidate_times(), &[at(7, 21, 0), at(8, 14, 0), at(8, 16, 0)]);

    swipe(&service, &event.id, "ana", SwipeDirection::Right).await;
    swipe(&service, &event.id, "ben", SwipeDirection::Right).await;
    let outcome = service
        .swipe(&event.id, Ballot::new("cy", SwipeDirection::Left))
        .await
        .unwrap();

    assert_eq!(outcome.event.status(), EventStatus::Confirmed);
    assert_eq!(outcome.event.confirmed_time(), Some(at(7, 21, 0)));
    assert_eq!(outcome.consensus.accepted, 2);
}

#[tokio::test]
async fn test_default_schedule_without_calendars() {
    let calendar = InMemoryCalendar::new();
    let service = service(&calendar);
    register(&service, &["ana", "ben"]).await;
    let hive = service.create_hive(new_hive(&["ana", "ben"])).await.unwrap();

    let event = service.create_event(new_event(&hive, "ben")).await.unwrap();
    assert_eq!(event.candidate_times(), &[at(14, 18, 0), at(21, 18, 0), at(28, 18, 0)]);
}

#[tokio::test]
async fn test_availability_report_lists_common_free_time() {
    let calendar = InMemoryCalendar::new();
    calendar.set_busy("rt-ana", vec![BusyInterval::new(at(7, 17, 0), at(7, 20, 30))]);
    calendar.set_failure("rt-ben", "token revoked");

    let service = service(&calendar);
    register(&service, &["ana", "ben"]).await;
    service.link_calendar(&"ana".into(), "rt-ana".into()).await.unwrap();
    service.link_calendar(&"ben".into(), "rt-ben".into()).await.unwrap();
    let hive = service.create_hive(new_hive(&["ana", "ben"])).await.unwrap();

    let report = service.availability(&hive.id, None).await.unwrap();
    assert_eq!(report.window.start, at(7, 9, 0));
    assert_eq!(report.window.end, at(7, 9, 0) + Duration::days(14));
    assert_eq!(report.members.len(), 1);
    assert_eq!(report.common_free_slots.len(), 2);
    assert_eq!(report.common_free_slots[0].end, at(7, 17, 0));
    assert_eq!(report.common_free_slots[1].start, at(7, 20, 30));
}

#[tokio::test]
async fn test_membership_and_ownership_rules() {
    let calendar = InMemoryCalendar::new();
    let service = service(&calendar);
    register(&service, &["ana", "ben", "eve"]).await;
    let hive = service.create_hive(new_hive(&["ana", "ben"])).await.unwrap();

    let outsider_create = service.create_event(new_event(&hive, "eve")).await;
    assert!(matches!(outsider_create, Err(HiveError::NotMember { .. })));

    let event = service.create_event(new_event(&hive, "ana")).await.unwrap();
    let outsider_vote = service
        .swipe(&event.id, Ballot::new("eve", SwipeDirection::Right))
        .await;
    assert!(matches!(outsider_vote, Err(HiveError::NotMember { .. })));

    let not_creator = service.delete_event(&event.id, &"ben".into()).await;
    assert!(matches!(not_creator, Err(HiveError::Forbidden(_))));

    service.delete_event(&event.id, &"ana".into()).await.unwrap();
    assert!(service.hive_events(&hive.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_hive_requires_known_members() {
    let calendar = InMemoryCalendar::new();
    let service = service(&calendar);
    register(&service, &["ana"]).await;

    let too_small = service.create_hive(new_hive(&["ana"])).await;
    assert!(matches!(too_small, Err(HiveError::InvalidInput(_))));

    let unknown = service.create_hive(new_hive(&["ana", "ghost"])).await;
    assert!(matches!(unknown, Err(HiveError::NotFound(_))));
}

#[tokio::test]
async fn test_rest_api_round_trip() {
    let calendar = InMemoryCalendar::new();
    let state = AppState {
        name: "test-node".into(),
        service: Arc::new(service(&calendar)),
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(serve(listener, state, async move {
        let _ = stop_rx.await;
    }));

    let client = reqwest::Client::new();

    let health: Value = client
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    for id in ["ana", "ben"] {
        let res = client
            .post(format!("{base}/api/members"))
            .json(&json!({ "id": id, "name": id }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 201);
    }

    let hive: Value = client
        .post(format!("{base}/api/hives"))
        .json(&json!({
            "name": "Climbers",
            "members": ["ana", "ben"],
            "activityFrequency": "biweekly"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let hive_id = hive["id"].as_str().unwrap().to_string();

    let event: Value = client
        .post(format!("{base}/api/events"))
        .json(&json!({ "hiveId": hive_id, "title": "Crag day", "createdBy": "ana" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let event_id = event["id"].as_str().unwrap().to_string();
    assert_eq!(event["status"], "proposed");
    assert_eq!(event["candidateTimes"].as_array().unwrap().len(), 3);

    let outsider = client
        .post(format!("{base}/api/events/{event_id}/swipe"))
        .json(&json!({ "memberId": "zed", "swipeDirection": "right" }))
        .send()
        .await
        .unwrap();
    assert_eq!(outsider.status(), 403);

    for member in ["ana", "ben"] {
        let res = client
            .post(format!("{base}/api/events/{event_id}/swipe"))
            .json(&json!({
                "memberId": member,
                "swipeDirection": "left",
                "responseTime": 1200
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
    }

    let late = client
        .post(format!("{base}/api/events/{event_id}/swipe"))
        .json(&json!({ "memberId": "ana", "swipeDirection": "right" }))
        .send()
        .await
        .unwrap();
    assert_eq!(late.status(), 409);
    let body: Value = late.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("terminal"));

    let stored: Value = client
        .get(format!("{base}/api/events/{event_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stored["status"], "cancelled");
    assert_eq!(stored["swipeLogs"].as_array().unwrap().len(), 2);

    let missing = client
        .get(format!("{base}/api/events/nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);

    let renamed = client
        .put(format!("{base}/api/events/{event_id}"))
        .json(&json!({ "memberId": "ben", "title": "Bouldering" }))
        .send()
        .await
        .unwrap();
    assert_eq!(renamed.status(), 200);
    let renamed: Value = renamed.json().await.unwrap();
    assert_eq!(renamed["title"], "Bouldering");

    let window = client
        .get(format!(
            "{base}/api/hives/{hive_id}/availability\
             ?windowStart=2025-03-08T10:00:00Z&windowEnd=2025-03-09T10:00:00Z"
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(window.status(), 200);
    let window: Value = window.json().await.unwrap();
    assert_eq!(window["window"]["start"], "2025-03-08T10:00:00Z");
    assert!(window["commonFreeSlots"].as_array().unwrap().is_empty());

    let half_window = client
        .get(format!(
            "{base}/api/hives/{hive_id}/availability?windowStart=2025-03-08T10:00:00Z"
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(half_window.status(), 400);

    let res = client
        .post(format!("{base}/api/members"))
        .json(&json!({ "id": "cy", "name": "cy" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    let joined = client
        .post(format!("{base}/api/hives/{hive_id}/members"))
        .json(&json!({ "memberId": "ana", "newMemberId": "cy" }))
        .send()
        .await
        .unwrap();
    assert_eq!(joined.status(), 200);

    let hives: Value = client
        .get(format!("{base}/api/hives?memberId=cy"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(hives.as_array().unwrap().len(), 1);

    let left = client
        .delete(format!("{base}/api/hives/{hive_id}/members/cy"))
        .send()
        .await
        .unwrap();
    assert_eq!(left.status(), 200);
    let left: Value = left.json().await.unwrap();
    assert_eq!(left["hive"]["members"].as_array().unwrap().len(), 2);

    let below_minimum = client
        .delete(format!("{base}/api/hives/{hive_id}/members/ben"))
        .send()
        .await
        .unwrap();
    assert_eq!(below_minimum.status(), 400);

    let _ = stop_tx.send(());
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_member_leaving_mid_vote_settles_open_events() {
    let calendar = InMemoryCalendar::new();
    let service = service(&calendar);
    register(&service, &["ana", "ben", "cy"]).await;
    let hive = service.create_hive(new_hive(&["ana", "ben", "cy"])).await.unwrap();

    let split = service.create_event(new_event(&hive, "ana")).await.unwrap();
    swipe(&service, &split.id, "ana", SwipeDirection::Right).await;
    swipe(&service, &split.id, "ben", SwipeDirection::Left).await;

    let declined = service.create_event(new_event(&hive, "ben")).await.unwrap();
    swipe(&service, &declined.id, "ana", SwipeDirection::Left).await;
    swipe(&service, &declined.id, "ben", SwipeDirection::Left).await;

    let waiting = service.create_event(new_event(&hive, "cy")).await.unwrap();
    swipe(&service, &waiting.id, "cy", SwipeDirection::Right).await;
    swipe(&service, &waiting.id, "ana", SwipeDirection::Right).await;

    let outcome = service.leave_hive(&hive.id, &"cy".into()).await.unwrap();
    assert_eq!(outcome.hive.members.len(), 2);
    assert_eq!(outcome.settled_events.len(), 2);

    let split = service.event(&split.id).await.unwrap();
    assert_eq!(split.status(), EventStatus::Confirmed);
    assert_eq!(split.confirmed_time(), Some(split.candidate_times()[0]));
    assert_eq!(
        service.event(&declined.id).await.unwrap().status(),
        EventStatus::Cancelled
    );
    // ben has not voted yet; cy's accept no longer counts.
    assert_eq!(
        service.event(&waiting.id).await.unwrap().status(),
        EventStatus::Proposed
    );

    let stranger = service.leave_hive(&hive.id, &"cy".into()).await;
    assert!(matches!(stranger, Err(HiveError::InvalidInput(_))));
    let last_pair = service.leave_hive(&hive.id, &"ben".into()).await;
    assert!(matches!(last_pair, Err(HiveError::InvalidInput(_))));
    assert_eq!(service.hive(&hive.id).await.unwrap().members.len(), 2);
}

#[tokio::test]
async fn test_hive_roster_and_details_updates() {
    let calendar = InMemoryCalendar::new();
    let service = service(&calendar);
    register(&service, &["ana", "ben", "cy", "eve"]).await;
    let hive = service.create_hive(new_hive(&["ana", "ben"])).await.unwrap();

    let invite = |by: &str, who: &str| HiveInvite {
        member_id: by.into(),
        new_member_id: who.into(),
    };
    let by_outsider = service.add_hive_member(&hive.id, invite("eve", "cy")).await;
    assert!(matches!(by_outsider, Err(HiveError::NotMember { .. })));
    let unknown = service.add_hive_member(&hive.id, invite("ana", "ghost")).await;
    assert!(matches!(unknown, Err(HiveError::NotFound(_))));
    let twice = service.add_hive_member(&hive.id, invite("ana", "ben")).await;
    assert!(matches!(twice, Err(HiveError::InvalidInput(_))));

    let grown = service.add_hive_member(&hive.id, invite("ben", "cy")).await.unwrap();
    assert_eq!(grown.members.len(), 3);
    assert_eq!(service.list_hives(&"cy".into()).await.unwrap().len(), 1);
    assert!(service.list_hives(&"eve".into()).await.unwrap().is_empty());

    let update = |by: &str, name: Option<&str>| HiveUpdate {
        member_id: by.into(),
        name: name.map(str::to_string),
        activity_frequency: Some(ActivityFrequency::Monthly),
        settings: Some(HiveSettings {
            require_all_accept: true,
        }),
    };
    let outsider = service.update_hive(&hive.id, update("eve", None)).await;
    assert!(matches!(outsider, Err(HiveError::NotMember { .. })));
    let blank = service.update_hive(&hive.id, update("ana", Some("  "))).await;
    assert!(matches!(blank, Err(HiveError::InvalidInput(_))));

    let updated = service
        .update_hive(&hive.id, update("cy", Some(" Chess club ")))
        .await
        .unwrap();
    assert_eq!(updated.name, "Chess club");
    assert_eq!(updated.activity_frequency, ActivityFrequency::Monthly);
    assert!(updated.settings.require_all_accept);
    assert_eq!(updated.members.len(), 3);
}

#[tokio::test]
async fn test_availability_over_requested_window() {
    let calendar = InMemoryCalendar::new();
    calendar.set_busy("rt-ana", vec![BusyInterval::new(at(10, 12, 0), at(10, 13, 0))]);

    let service = service(&calendar);
    register(&service, &["ana", "ben"]).await;
    service.link_calendar(&"ana".into(), "rt-ana".into()).await.unwrap();
    let hive = service.create_hive(new_hive(&["ana", "ben"])).await.unwrap();

    let window = TimeWindow::new(at(10, 9, 0), at(10, 17, 0)).unwrap();
    let report = service.availability(&hive.id, Some(window)).await.unwrap();
    assert_eq!(report.window, window);
    assert_eq!(report.common_free_slots.len(), 2);
    assert_eq!(report.common_free_slots[0].start, at(10, 9, 0));
    assert_eq!(report.common_free_slots[1].end, at(10, 17, 0));

    assert!(matches!(
        TimeWindow::new(at(10, 17, 0), at(10, 9, 0)),
        Err(HiveError::InvalidInput(_))
    ));
    let year_and_a_day =
        TimeWindow::new(at(10, 9, 0), at(10, 9, 0) + Duration::days(366)).unwrap();
    let too_long = service.availability(&hive.id, Some(year_and_a_day)).await;
    assert!(matches!(too_long, Err(HiveError::InvalidInput(_))));
}

#[tokio::test]
async fn test_event_details_edited_by_hive_members_only() {
    let calendar = InMemoryCalendar::new();
    let service = service(&calendar);
    register(&service, &["ana", "ben", "eve"]).await;
    let hive = service.create_hive(new_hive(&["ana", "ben"])).await.unwrap();
    let event = service.create_event(new_event(&hive, "ana")).await.unwrap();

    let edit = |by: &str, title: &str| EventUpdate {
        member_id: by.into(),
        changes: EventChanges {
            title: Some(title.into()),
            description: Some("Bring snacks".into()),
            location: Some(Location {
                name: "Ben's place".into(),
                ..Location::default()
            }),
        },
    };
    let outsider = service.update_event(&event.id, edit("eve", "Hijacked")).await;
    assert!(matches!(outsider, Err(HiveError::NotMember { .. })));

    let edited = service
        .update_event(&event.id, edit("ben", "Catan finals"))
        .await
        .unwrap();
    assert_eq!(edited.title, "Catan finals");
    assert_eq!(edited.description.as_deref(), Some("Bring snacks"));
    assert_eq!(edited.candidate_times(), event.candidate_times());
    assert_eq!(edited.status(), EventStatus::Proposed);
}
