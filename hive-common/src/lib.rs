//! Shared types for the hive consensus & availability service.
//!
//! Everything that crosses a crate boundary lives here: identifiers,
//! time intervals, vote enums, hive records and the common error type.

pub mod error;
pub mod types;
pub mod utils;

pub use error::{HiveError, Result};
pub use types::{
    event::{EventId, EventStatus, SwipeDirection, Vote},
    hive::{ActivityFrequency, Hive, HiveId, HiveSettings},
    interval::{BusyInterval, FreeSlot, TimeWindow},
    member::{CalendarCredential, Member, MemberId},
};
