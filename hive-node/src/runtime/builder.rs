use std::sync::Arc;

use hive_availability::{AvailabilityAggregator, GoogleCalendarProvider};
use hive_common::Result;
use hive_consensus::ConsensusEngine;
use tracing::{info, warn};

use crate::{
    config::Config,
    directory::{Directory, DirectorySeed},
    service::HiveService,
};

pub struct HiveRuntime {
    pub config: Config,
    pub service: Arc<HiveService>,
}

/// Wires directory, calendar access, aggregator and consensus engine.
///
/// Calendars are read through Google when credentials are configured and
/// `offline_calendar` is not set; otherwise no calendar is read at all.
pub fn build_runtime(config: Config, offline_calendar: bool) -> Result<HiveRuntime> {
    config.validate()?;

    let directory = match &config.directory_path {
        Some(path) => {
            info!("📇 Loading directory from {}", path);
            Directory::from_seed(DirectorySeed::load_from_file(path)?)?
        }
        None => Directory::new(),
    };

    let aggregator_config = config.aggregator_config()?;
    let google = if offline_calendar {
        None
    } else {
        config.google_credentials()
    };
    let aggregator = match google {
        Some(google) => {
            info!("📅 Using Google Calendar free/busy at {}", google.api_base);
            let provider = Arc::new(GoogleCalendarProvider::new(google));
            AvailabilityAggregator::new(provider, aggregator_config)
        }
        None => {
            warn!("⚠️ Calendar reads disabled; proposals use the default schedule");
            AvailabilityAggregator::offline(aggregator_config)
        }
    };

    let service = HiveService::new(Arc::new(directory), aggregator, ConsensusEngine::new());

    info!("✅ Runtime for [{}] built", config.name);
    Ok(HiveRuntime {
        config,
        service: Arc::new(service),
    })
}
