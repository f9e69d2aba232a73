//! Small helpers shared by the service crates.

pub mod time;
