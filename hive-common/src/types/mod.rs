pub mod event;
pub mod hive;
pub mod interval;
pub mod member;
