//! Upstream error types

use thiserror::Error;

/// Failures talking to a third-party service.
///
/// These are logged server-side only; callers see the route's generic
/// message instead.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The request could not be sent or timed out
    #[error("Request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status
    #[error("Unexpected status: {0}")]
    Status(u16),

    /// The body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// The service answered but had nothing for the query
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            UpstreamError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            UpstreamError::Status(status.as_u16())
        } else {
            UpstreamError::Request(err.to_string())
        }
    }
}
