// Middleware module - logging, content negotiation, caching, metrics

pub mod json_validation;
pub mod metrics;
pub mod no_cache;
pub mod request_logger;

pub use json_validation::json_content_type_middleware;
pub use metrics::metrics_middleware;
pub use no_cache::add_no_cache_headers;
pub use request_logger::request_logger_middleware;
