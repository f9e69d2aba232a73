//! Availability aggregation for hive members.
//!
//! Turns members' busy intervals into free slots, intersects them across the
//! group and picks up to three candidate meeting times. Calendar access goes
//! through the [`CalendarProvider`] port; failing or slow calendars only drop
//! the affected member.

pub mod aggregator;
pub mod candidates;
pub mod google;
pub mod provider;
pub mod slots;

pub use aggregator::{
    AggregatorConfig, AvailabilityAggregator, MemberAvailability, MAX_WINDOW_DAYS,
};
pub use candidates::{default_schedule, propose_candidate_times, MAX_CANDIDATES};
pub use google::{GoogleCalendarConfig, GoogleCalendarProvider};
pub use provider::{CalendarProvider, InMemoryCalendar};
pub use slots::{common_free_slots, compute_free_slots, intersect_slots};
