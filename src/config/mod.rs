use anyhow::Result;
use std::env;
use std::time::Duration;

pub const DEFAULT_DIRECTUS_BASE_URL: &str = "https://log.bula21.ch";
pub const DEFAULT_SLACK_WEBHOOK_BASE_URL: &str = "https://hooks.slack.com/services";

/// Wall-clock bound on the synchronous part of a request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);
/// Maximum number of inbound requests in flight at once.
pub const MAX_CONCURRENT_REQUESTS: usize = 50;
/// Bound on a single outbound Slack call.
pub const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(10);

/// Process-wide configuration, built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    /// bcrypt hash the caller key is verified against
    pub key_hash: String,
    /// Directus instance used for admin links, without trailing slash
    pub directus_base_url: String,
    /// Prefix the three-segment Slack path is appended to
    pub slack_webhook_base_url: String,
    pub addr: String,
    pub port: u16,
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let key_hash = env::var("KEY_HASH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("KEY_HASH environment variable is required"))?;

        let port = match env::var("PORT") {
            Ok(port) if !port.trim().is_empty() => port
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT must be a valid port number: {}", e))?,
            _ => 8080,
        };

        Self::new(
            key_hash,
            env::var("DIRECTUS_BASE_URL").ok(),
            env::var("SLACK_WEBHOOK_BASE_URL").ok(),
            env::var("ADDR").ok(),
            port,
        )
        .map(|config| Config {
            log_json: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            ..config
        })
    }

    /// Builds a validated configuration. Blank optional values fall back to defaults.
    pub fn new(
        key_hash: String,
        directus_base_url: Option<String>,
        slack_webhook_base_url: Option<String>,
        addr: Option<String>,
        port: u16,
    ) -> Result<Self> {
        let key_hash = key_hash.trim().to_string();
        // verify() only errors when the hash itself cannot be decoded
        bcrypt::verify("", &key_hash)
            .map_err(|e| anyhow::anyhow!("KEY_HASH is not a valid bcrypt hash: {}", e))?;

        Ok(Config {
            key_hash,
            directus_base_url: non_blank_url(directus_base_url, DEFAULT_DIRECTUS_BASE_URL),
            slack_webhook_base_url: non_blank_url(
                slack_webhook_base_url,
                DEFAULT_SLACK_WEBHOOK_BASE_URL,
            ),
            addr: addr
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            log_json: false,
        })
    }

    /// `host:port` to bind; the host may be a name and is resolved at bind time.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

fn non_blank_url(value: Option<String>, default: &str) -> String {
    let trimmed = value
        .as_deref()
        .map(|v| v.trim().trim_end_matches('/'))
        .unwrap_or("");
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash() -> String {
        bcrypt::hash("secret", 4).unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::new(hash(), None, None, None, 8080).unwrap();

        assert_eq!(config.directus_base_url, DEFAULT_DIRECTUS_BASE_URL);
        assert_eq!(config.slack_webhook_base_url, DEFAULT_SLACK_WEBHOOK_BASE_URL);
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = Config::new(
            hash(),
            Some("https://cms.example.org/".to_string()),
            Some("  ".to_string()),
            Some("127.0.0.1".to_string()),
            9000,
        )
        .unwrap();

        assert_eq!(config.directus_base_url, "https://cms.example.org");
        assert_eq!(config.slack_webhook_base_url, DEFAULT_SLACK_WEBHOOK_BASE_URL);
        assert_eq!(config.listen_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn test_malformed_hash_rejected() {
        let result = Config::new("not-a-hash".to_string(), None, None, None, 8080);
        assert!(result.is_err());
    }
}
