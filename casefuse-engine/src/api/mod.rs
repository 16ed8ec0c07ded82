//! HTTP API handlers for casefuse-engine

pub mod health;
pub mod middleware;
pub mod multi_source;

pub use health::health_routes;
pub use middleware::{attach_request_context, validate_request_context, RequestContext};
pub use multi_source::multi_source_routes;
