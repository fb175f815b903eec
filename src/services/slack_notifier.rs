use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::middleware::metrics::track_dispatch;
use crate::models::{OutboundMessage, RelayTarget};

const SLACK_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Failure of a single outbound call. Never reaches the original caller.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to serialize Slack payload: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Network, TLS or timeout failure. The URL is stripped since it embeds the secret path.
    #[error("Slack request failed: {0}")]
    Transport(reqwest::Error),

    #[error("Slack returned non-2xx status {0}")]
    Status(StatusCode),
}

/// Posts rendered messages to Slack incoming webhooks.
#[derive(Clone, Debug)]
pub struct SlackNotifier {
    client: Client,
    base_url: String,
}

impl SlackNotifier {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Sends one message and waits for the outcome. No retries.
    pub async fn send(
        &self,
        target: &RelayTarget,
        message: &OutboundMessage,
    ) -> Result<(), DispatchError> {
        let body = serde_json::to_vec(message)?;

        let response = self
            .client
            .post(target.url(&self.base_url))
            .header(CONTENT_TYPE, SLACK_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.without_url()))?;

        let status = response.status();
        // Drain the body so the connection can be reused
        response
            .bytes()
            .await
            .map_err(|e| DispatchError::Transport(e.without_url()))?;

        if !status.is_success() {
            return Err(DispatchError::Status(status));
        }

        Ok(())
    }

    /// Fire-and-forget delivery: at most once, best effort.
    ///
    /// The spawned task is independent of the request that created it; the
    /// caller may drop the handle. Its only observable effect is a log line
    /// and a metric.
    pub fn dispatch_detached(
        &self,
        target: RelayTarget,
        message: OutboundMessage,
    ) -> JoinHandle<()> {
        let notifier = self.clone();

        tokio::spawn(async move {
            match notifier.send(&target, &message).await {
                Ok(()) => {
                    info!("Slack notification delivered");
                    track_dispatch(true);
                }
                Err(e) => {
                    error!(error = %e, "Slack notification failed");
                    track_dispatch(false);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message() -> OutboundMessage {
        OutboundMessage {
            text: "hello <world>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_posts_json_to_target() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/AAA/BBB/CCC"))
            .and(header("content-type", SLACK_CONTENT_TYPE))
            .and(body_json(serde_json::json!({ "text": "hello <world>" })))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let notifier =
            SlackNotifier::new(format!("{}/services", server.uri()), Duration::from_secs(5));
        let target = RelayTarget::parse("AAA/BBB/CCC").unwrap();

        notifier.send(&target, &message()).await.unwrap();
    }

    #[tokio::test]
    async fn test_non_2xx_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no_service"))
            .mount(&server)
            .await;

        let notifier = SlackNotifier::new(server.uri(), Duration::from_secs(5));
        let target = RelayTarget::parse("AAA/BBB/CCC").unwrap();

        let err = notifier.send(&target, &message()).await.unwrap_err();
        assert!(matches!(err, DispatchError::Status(status) if status == StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_transport_error_hides_secret_path() {
        // Nothing listens on port 9 of localhost in the test environment
        let notifier = SlackNotifier::new("http://127.0.0.1:9", Duration::from_secs(2));
        let target = RelayTarget::parse("T0/B0/topsecret").unwrap();

        let err = notifier.send(&target, &message()).await.unwrap_err();
        assert!(matches!(err, DispatchError::Transport(_)));
        assert!(!err.to_string().contains("topsecret"));
    }

    #[tokio::test]
    async fn test_detached_dispatch_swallows_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = SlackNotifier::new(server.uri(), Duration::from_secs(5));
        let target = RelayTarget::parse("AAA/BBB/CCC").unwrap();

        // The task completes normally even though Slack rejected the message
        notifier
            .dispatch_detached(target, message())
            .await
            .unwrap();
    }
}
