// Data models
// Inbound change events, relay targets and outbound Slack payloads.

pub mod change_event;

pub use change_event::{ChangeEvent, OutboundMessage, RecordId, RelayTarget};
