//! Slack message rendering for Directus change events.
//!
//! Output uses Slack mrkdwn: `<url|label>` links, backtick code spans and
//! `*bold*`. See https://api.slack.com/reference/surfaces/formatting

use std::fmt::Write;

use serde_json::Value;

use crate::error::ApiError;
use crate::models::{ChangeEvent, OutboundMessage};

/// Builds the Slack text for a change event.
#[derive(Debug, Clone)]
pub struct MessageRenderer {
    directus_base_url: String,
}

impl MessageRenderer {
    pub fn new(directus_base_url: impl Into<String>) -> Self {
        Self {
            directus_base_url: directus_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Admin profile of the user who made the change.
    pub fn user_url(&self, user_id: u64) -> String {
        format!("{}/admin/#/_/users/{}", self.directus_base_url, user_id)
    }

    /// Admin page of the changed record.
    pub fn record_url(&self, event: &ChangeEvent) -> String {
        format!(
            "{}/admin/#/_/collections/{}/{}",
            self.directus_base_url, event.object_type_name, event.record_id
        )
    }

    pub fn render(&self, event: &ChangeEvent) -> Result<OutboundMessage, ApiError> {
        let user_url = escape_mrkdwn(&self.user_url(event.modified_by));
        let record_url = escape_mrkdwn(&self.record_url(event));
        let record_id = escape_mrkdwn(&event.record_id.to_string());

        let mut text = format!(
            "<{}|Der User mit ID {}> hat der/die/das <{}|{} mit ID {}> erstellt/editiert/gelöscht.",
            user_url,
            event.modified_by,
            record_url,
            escape_mrkdwn(&title_case(&event.object_type_name)),
            record_id,
        );

        text.push_str("\n\nLinks zum copy-pasten:\n");
        let _ = writeln!(text, "`{}`", user_url);
        let _ = writeln!(text, "`{}`", record_url);

        text.push_str("\n\n*Änderungen*:\n");
        for (field, value) in &event.changed_fields {
            let value = format_value(value)
                .map_err(|e| ApiError::Render(format!("field `{}`: {}", field, e)))?;
            let _ = writeln!(text, "- {}: {}", escape_mrkdwn(field), escape_mrkdwn(&value));
        }

        Ok(OutboundMessage { text })
    }
}

/// Escapes the three mrkdwn control characters.
///
/// `&` goes first so the entities produced for `<` and `>` stay intact.
pub fn escape_mrkdwn(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Upper-cases the first letter of every word and lower-cases the rest.
///
/// Underscores, apostrophes, dots and colons do not start a new word, so
/// `event_types` becomes `Event_types` and `foo.bar` becomes `Foo.bar`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;

    for c in s.chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = !matches!(c, '_' | '\'' | '.' | ':');
        }
    }

    out
}

/// Natural string form of a changed value: strings unquoted, containers as compact JSON.
fn format_value(value: &Value) -> Result<String, serde_json::Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok("null".to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value),
    }
}
