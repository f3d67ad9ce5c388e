//! URL shortener (GET /api/shorten)
//!
//! Short links are records only; nothing resolves them.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Response,
};
use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::api::{policy::SHORTEN, respond, AppState, ClientIdentity};
use crate::error::{ApiError, Result};
use crate::models::requests::required;
use crate::models::ShortenQuery;
use crate::routes::query_params;

const CODE_LENGTH: usize = 6;
const MAX_CUSTOM_LENGTH: usize = 32;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortLink {
    pub original_url: String,
    pub short_url: String,
    pub short_code: String,
    pub created_at: String,
    pub expires_at: String,
    pub clicks: u64,
}

/// Handler for GET /api/shorten
pub async fn shorten_handler(
    State(state): State<AppState>,
    ClientIdentity(identity): ClientIdentity,
    query: std::result::Result<Query<ShortenQuery>, QueryRejection>,
) -> Response {
    let result = shorten(&state, &identity, query).await;
    respond(&SHORTEN, &identity, result)
}

async fn shorten(
    state: &AppState,
    identity: &str,
    query: std::result::Result<Query<ShortenQuery>, QueryRejection>,
) -> Result<Value> {
    state.check_rate(&SHORTEN, identity).await?;
    let query = query_params(query)?;

    let raw = required(&query.url, "URL parameter is required")?;
    let url = Url::parse(raw).map_err(|_| ApiError::validation("Invalid URL format"))?;
    let custom = validate_custom(query.custom.as_deref())?;

    // The same URL keeps its code for the lifetime of the record
    let key = format!("{}|{}", custom.as_deref().unwrap_or(""), url);
    let base = state.config.short_link_base.clone();
    state
        .cached(&SHORTEN, &key, || async move {
            let link = create_short_link(&url, custom.as_deref(), &base);
            serde_json::to_value(link)
                .map_err(|e| ApiError::internal("URL shortening failed", e.to_string()))
        })
        .await
}

/// Accepts an optional custom code of up to 32 ASCII letters, digits, `-` or `_`.
pub fn validate_custom(custom: Option<&str>) -> Result<Option<String>> {
    let Some(code) = custom.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };

    let valid = code.len() <= MAX_CUSTOM_LENGTH
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(ApiError::validation(format!(
            "custom must be at most {MAX_CUSTOM_LENGTH} letters, digits, '-' or '_'"
        )));
    }
    Ok(Some(code.to_string()))
}

pub fn create_short_link(url: &Url, custom: Option<&str>, base: &str) -> ShortLink {
    let code = custom.map(str::to_string).unwrap_or_else(generate_code);
    let now = Utc::now();

    ShortLink {
        original_url: url.to_string(),
        short_url: format!("{}/{}", base.trim_end_matches('/'), code),
        short_code: code,
        created_at: now.to_rfc3339(),
        expires_at: (now + Duration::days(365)).to_rfc3339(),
        clicks: 0,
    }
}

fn generate_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_LENGTH)
        .map(char::from)
        .collect()
}
