//! Request DTOs for the API
//!
//! Query-string and JSON bodies accepted by the routes. Every field arrives
//! as an optional string so validation can name the offending parameter in
//! an envelope instead of failing in the extractor.

use serde::Deserialize;

use crate::error::{ApiError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordQuery {
    pub length: Option<String>,
    pub count: Option<String>,
    pub uppercase: Option<String>,
    pub lowercase: Option<String>,
    pub numbers: Option<String>,
    pub symbols: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColorsQuery {
    #[serde(rename = "type")]
    pub palette: Option<String>,
    pub count: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShortenQuery {
    pub url: Option<String>,
    pub custom: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuotesQuery {
    pub category: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemeQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CryptoQuery {
    pub coin: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
    pub units: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct YoutubeQuery {
    pub url: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QrQuery {
    pub text: Option<String>,
    pub size: Option<String>,
    pub format: Option<String>,
    pub color: Option<String>,
    pub background: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsQuery {
    pub category: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<String>,
}

/// Body of POST /api/ai/chat
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub conversation_id: Option<String>,
}

// == Field Helpers ==

/// Returns the trimmed value of a required parameter, or a 400 with `message`.
pub fn required<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation(message))
}

/// Returns the trimmed value of an optional parameter, or `default`.
pub fn or_default<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

/// Parses an optional integer parameter, clamped to `min..=max`.
///
/// Integers too large for `i64` still clamp to the nearest bound.
pub fn clamped_number(
    value: &Option<String>,
    name: &str,
    default: u32,
    min: u32,
    max: u32,
) -> Result<u32> {
    let Some(raw) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(default.clamp(min, max));
    };
    if let Ok(n) = raw.parse::<i64>() {
        return Ok(n.clamp(min as i64, max as i64) as u32);
    }

    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::validation(format!("{name} must be a number")));
    }
    Ok(if negative { min } else { max })
}

/// Reads a boolean flag; only `"true"` enables it once the flag is present.
pub fn flag(value: &Option<String>, default: bool) -> bool {
    match value.as_deref() {
        None => default,
        Some(raw) => raw.trim().eq_ignore_ascii_case("true"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_query_renames_type() {
        let query: ColorsQuery = serde_json::from_str(r#"{"type": "warm", "count": "3"}"#).unwrap();
        assert_eq!(query.palette.as_deref(), Some("warm"));
        assert_eq!(query.count.as_deref(), Some("3"));
        assert!(query.format.is_none());
    }

    #[test]
    fn test_required_rejects_blank() {
        let err = required(&Some("   ".to_string()), "City parameter is required").unwrap_err();
        assert_eq!(err.to_string(), "City parameter is required");
        assert!(required(&None, "x").is_err());
        assert_eq!(required(&Some(" Paris ".to_string()), "x").unwrap(), "Paris");
    }

    #[test]
    fn test_clamped_number() {
        assert_eq!(clamped_number(&None, "length", 12, 4, 128).unwrap(), 12);
        assert_eq!(clamped_number(&Some("2".into()), "length", 12, 4, 128).unwrap(), 4);
        assert_eq!(clamped_number(&Some("-5".into()), "count", 1, 1, 10).unwrap(), 1);
        assert_eq!(clamped_number(&Some("999".into()), "length", 12, 4, 128).unwrap(), 128);

        let err = clamped_number(&Some("abc".into()), "length", 12, 4, 128).unwrap_err();
        assert_eq!(err.to_string(), "length must be a number");
    }

    #[test]
    fn test_clamped_number_saturates_beyond_i64() {
        let huge = Some("99999999999999999999999".to_string());
        assert_eq!(clamped_number(&huge, "length", 12, 4, 128).unwrap(), 128);

        let tiny = Some("-99999999999999999999999".to_string());
        assert_eq!(clamped_number(&tiny, "count", 5, 1, 10).unwrap(), 1);

        assert!(clamped_number(&Some("-".into()), "count", 5, 1, 10).is_err());
        assert!(clamped_number(&Some("99999999999999999999x".into()), "count", 5, 1, 10).is_err());
    }

    #[test]
    fn test_flag() {
        assert!(flag(&None, true));
        assert!(!flag(&None, false));
        assert!(flag(&Some("TRUE".into()), false));
        assert!(!flag(&Some("yes".into()), true));
    }
}
