//! Invocation handler
//!
//! One call per function invocation: normalize the payload, route it and
//! run the transfers. The handler answers with an empty string whatever
//! happens; failures only show up in the log.

use fanout_core::{compute_destinations, normalize, Event, FanoutConfig, Result};
use fanout_storage::{ClientFactory, DefaultClientFactory};
use std::path::Path;
use tracing::{error, info};

use crate::orchestrator::{process, TransferReport};

/// What an accepted event led to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No output rule matched the object key
    NoMatch(Event),
    /// The object was downloaded and the uploads attempted
    Delivered(TransferReport),
}

/// Normalize `raw`, compute its destinations and copy the object to them
pub async fn route_event(
    raw: &[u8],
    config: &FanoutConfig,
    factory: &dyn ClientFactory,
) -> Result<Outcome> {
    let event = normalize(raw)?;
    info!(
        "Received {} event from file '{}'",
        event.event_source, event.object_key
    );

    let destinations = compute_destinations(&event, &config.outputs);
    if destinations.is_empty() {
        info!("No output rule matches file '{}'", event.object_key);
        return Ok(Outcome::NoMatch(event));
    }

    let report = process(&event, config, &destinations, factory).await?;
    info!(
        "File '{}' delivered to {} of {} destinations",
        report.file_name,
        report.succeeded(),
        report.uploads.len()
    );
    Ok(Outcome::Delivered(report))
}

/// Run one invocation with an already loaded configuration
pub async fn handle(raw: &[u8], config: &FanoutConfig, factory: &dyn ClientFactory) -> String {
    if let Err(e) = route_event(raw, config, factory).await {
        error!(code = e.code(), "{}", e);
    }
    String::new()
}

/// Run one invocation, loading the configuration from `config_path`
pub async fn handle_request(raw: &[u8], config_path: &Path) -> String {
    let config = match FanoutConfig::from_file(config_path) {
        Ok(config) => config,
        Err(e) => {
            error!(code = e.code(), "{}", e);
            return String::new();
        }
    };

    config.validate();

    handle(raw, &config, &DefaultClientFactory).await
}
