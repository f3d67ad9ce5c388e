//! Response envelope shared by every endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uniform success/error wrapper around every endpoint payload.
///
/// `data` and `error` are always present on the wire, as `null` when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    /// RFC 3339 UTC timestamp with millisecond precision
    pub timestamp: String,
    pub data: Option<Value>,
    pub error: Option<String>,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

impl Envelope {
    /// Builds an envelope stamped with the current time.
    pub fn build(
        success: bool,
        data: Option<Value>,
        error: Option<String>,
        status_code: u16,
    ) -> Self {
        Self {
            success,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            data,
            error,
            status_code,
        }
    }

    /// 200 envelope carrying `data`.
    pub fn ok(data: Value) -> Self {
        Self::build(true, Some(data), None, StatusCode::OK.as_u16())
    }

    /// Failed envelope with a caller-facing message.
    pub fn failure(message: impl Into<String>, status: StatusCode) -> Self {
        Self::build(false, None, Some(message.into()), status.as_u16())
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use serde_json::json;

    #[test]
    fn test_success_envelope_serialization() {
        let envelope = Envelope::build(true, Some(json!({"coin": "bitcoin"})), None, 200);
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["success"], json!(true));
        assert_eq!(json["statusCode"], json!(200));
        assert_eq!(json["error"], Value::Null);
        assert_eq!(json["data"]["coin"], json!("bitcoin"));
        assert!(DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_failure_envelope_serialization() {
        let envelope = Envelope::build(false, None, Some("X".to_string()), 500);
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["success"], json!(false));
        assert_eq!(json["data"], Value::Null);
        assert_eq!(json["error"], json!("X"));
        assert_eq!(json["statusCode"], json!(500));
    }

    #[test]
    fn test_timestamp_is_utc_millis() {
        let envelope = Envelope::ok(json!(null));
        assert!(envelope.timestamp.ends_with('Z'));
        // 2024-01-01T00:00:00.000Z
        assert_eq!(envelope.timestamp.len(), 24);
    }

    #[test]
    fn test_into_response_uses_status_code() {
        let response = Envelope::failure("Rate limit exceeded", StatusCode::TOO_MANY_REQUESTS)
            .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
