//! CORS Gate
//!
//! Stamps the cross-origin headers on every response and answers preflight
//! requests before any rate limiting or route logic runs.

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Outcome of running the gate on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Preflight answered; nothing else should run
    Handled,
    Continue,
}

/// Inserts the CORS headers into `headers` and classifies the request.
pub fn apply(method: &Method, headers: &mut HeaderMap) -> GateDecision {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );

    if method == Method::OPTIONS {
        GateDecision::Handled
    } else {
        GateDecision::Continue
    }
}

/// Router middleware wrapping [`apply`].
pub async fn cors_gate(request: Request, next: Next) -> Response {
    let mut cors_headers = HeaderMap::new();

    let mut response = match apply(request.method(), &mut cors_headers) {
        GateDecision::Handled => StatusCode::OK.into_response(),
        GateDecision::Continue => next.run(request).await,
    };

    response.headers_mut().extend(cors_headers);
    response
}
