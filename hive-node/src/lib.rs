pub mod api;
pub mod cli;
pub mod config;
pub mod directory;
pub mod runtime;
pub mod service;
pub mod setup;

pub use config::Config;
pub use runtime::builder::build_runtime;
pub use service::HiveService;
