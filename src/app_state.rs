//! Application state shared across all handlers.
//!
//! Everything in here is immutable after startup; requests share it without
//! locking.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::{Config, OUTBOUND_TIMEOUT};
use crate::services::{KeyVerifier, MessageRenderer, SlackNotifier};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Caller key verification against the configured bcrypt hash
    pub key_verifier: KeyVerifier,
    /// Slack message builder
    pub renderer: MessageRenderer,
    /// Outbound Slack client
    pub notifier: SlackNotifier,
    /// Prometheus handle, absent when no recorder was installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: Config, metrics: Option<PrometheusHandle>) -> Self {
        let key_verifier = KeyVerifier::new(config.key_hash.as_str());
        let renderer = MessageRenderer::new(config.directus_base_url.clone());
        let notifier = SlackNotifier::new(config.slack_webhook_base_url.clone(), OUTBOUND_TIMEOUT);

        Self {
            config: Arc::new(config),
            key_verifier,
            renderer,
            notifier,
            metrics,
        }
    }
}
