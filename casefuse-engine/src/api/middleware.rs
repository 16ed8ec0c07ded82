//! Request context middleware for the multi-source routes
//!
//! `attach_request_context` runs first and stores a `RequestContext` in the
//! request extensions; `validate_request_context` then rejects the request
//! with 400 unless every required category label is present. Responses carry
//! the context id in `x-request-id`.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::types::InsightCategory;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-request metadata envelope
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub request_id: Uuid,
    pub level: u8,
    pub categories: Vec<String>,
}

impl RequestContext {
    /// Fresh context carrying every required category
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            level: 1,
            categories: InsightCategory::ALL
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
        }
    }

    /// Required categories this context does not carry
    pub fn missing_categories(&self) -> Vec<&'static str> {
        InsightCategory::ALL
            .iter()
            .map(|c| c.as_str())
            .filter(|required| !self.categories.iter().any(|c| c == required))
            .collect()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Attach a fresh `RequestContext` and echo its id on the response
pub async fn attach_request_context(mut request: Request, next: Next) -> Response {
    let context = RequestContext::new();
    let request_id = context.request_id;

    debug!(
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
        "Request context attached"
    );

    request.extensions_mut().insert(context);
    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }

    response
}

/// Reject requests whose context lacks a required category
pub async fn validate_request_context(request: Request, next: Next) -> Result<Response, ApiError> {
    let Some(context) = request.extensions().get::<RequestContext>() else {
        return Err(ApiError::BadRequest("Request context missing".to_string()));
    };

    let missing = context.missing_categories();
    if !missing.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "Request context missing categories: {}",
            missing.join(", ")
        )));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_is_complete() {
        let context = RequestContext::new();
        assert!(context.missing_categories().is_empty());
        assert_eq!(context.request_id.get_version_num(), 4);
    }

    #[test]
    fn test_missing_categories_reported() {
        let mut context = RequestContext::new();
        context.categories.retain(|c| c != "process");
        assert_eq!(context.missing_categories(), vec!["process"]);
    }
}
