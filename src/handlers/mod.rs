pub mod health;
pub mod relay;

pub use health::{health_check, prometheus_metrics};
pub use relay::relay_change;
