// Business logic services
// Key verification, message rendering and Slack delivery.

pub mod key_verifier;
pub mod message;
pub mod slack_notifier;

pub use key_verifier::KeyVerifier;
pub use message::MessageRenderer;
pub use slack_notifier::{DispatchError, SlackNotifier};
