//! Application startup and initialization logic.

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::Config;

const DEFAULT_LOG_FILTER: &str = "directus_slack_relay=info,tower_http=info";

/// Install the global tracing subscriber.
pub fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Initialize application services and create the AppState.
pub fn initialize_app(config: Config) -> Result<AppState> {
    // A second install in the same process fails; the relay still works without metrics
    let metrics_handle = match metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
    {
        Ok(handle) => {
            info!("Prometheus metrics initialized");
            Some(handle)
        }
        Err(e) => {
            warn!("Prometheus recorder not installed: {}", e);
            None
        }
    };

    info!(
        directus_base_url = %config.directus_base_url,
        slack_webhook_base_url = %config.slack_webhook_base_url,
        "Relay configured"
    );

    Ok(AppState::new(config, metrics_handle))
}
