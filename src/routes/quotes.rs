//! Quotes (GET /api/quotes)
//!
//! Random quote from quotable.io. Any upstream failure degrades to a canned
//! quote marked `source: "fallback"`.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Response,
};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::{policy::QUOTES, respond, AppState, ClientIdentity};
use crate::cache::{current_timestamp_ms, time_bucket};
use crate::error::{ApiError, Result};
use crate::models::requests::or_default;
use crate::models::QuotesQuery;
use crate::routes::query_params;
use crate::upstream::{Source, Sourced, UpstreamClient, UpstreamError};

/// Categories forwarded to quotable as tags.
const KNOWN_TAGS: &[&str] = &[
    "inspirational",
    "motivational",
    "success",
    "wisdom",
    "life",
    "love",
    "friendship",
    "happiness",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub quote: String,
    pub author: String,
    pub category: String,
    pub length: usize,
    pub tags: Vec<String>,
    pub source: Source,
}

#[derive(Debug, Deserialize)]
struct QuotableQuote {
    content: String,
    author: String,
    #[serde(default)]
    tags: Vec<String>,
}

/// Handler for GET /api/quotes
pub async fn quotes_handler(
    State(state): State<AppState>,
    ClientIdentity(identity): ClientIdentity,
    query: std::result::Result<Query<QuotesQuery>, QueryRejection>,
) -> Response {
    let result = quote(&state, &identity, query).await;
    respond(&QUOTES, &identity, result)
}

async fn quote(
    state: &AppState,
    identity: &str,
    query: std::result::Result<Query<QuotesQuery>, QueryRejection>,
) -> Result<Value> {
    state.check_rate(&QUOTES, identity).await?;
    let query = query_params(query)?;

    let category = or_default(&query.category, "inspirational").to_ascii_lowercase();
    let author = query
        .author
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());

    let key = format!(
        "{category}:{}:{}",
        author.unwrap_or("any").to_lowercase(),
        time_bucket(current_timestamp_ms(), QUOTES.ttl_secs)
    );
    state
        .cached(&QUOTES, &key, || async {
            let quote = fetch_quote(&state.upstream, &category, author).await;
            if quote.is_fallback() {
                warn!(route = QUOTES.name, client = identity, "quotes upstream unavailable, serving fallback");
            }
            serde_json::to_value(quote.into_inner())
                .map_err(|e| ApiError::internal("Quotes service unavailable", e.to_string()))
        })
        .await
}

/// Fetches a quote, falling back to the canned set on any failure.
pub async fn fetch_quote(
    upstream: &UpstreamClient,
    category: &str,
    author: Option<&str>,
) -> Sourced<Quote> {
    let live = fetch_live(upstream, category, author).await;
    Sourced::or_fallback(live, |err| {
        debug!(error = %err, "quotable request failed");
        fallback_quote()
    })
}

async fn fetch_live(
    upstream: &UpstreamClient,
    category: &str,
    author: Option<&str>,
) -> std::result::Result<Quote, UpstreamError> {
    let mut params = Vec::new();
    if KNOWN_TAGS.contains(&category) {
        params.push(("tags", category));
    }
    if let Some(author) = author {
        params.push(("author", author));
    }

    let url = format!("{}/random", upstream.config().quotable_base_url);
    let raw: QuotableQuote = upstream.get_json(&url, &params).await?;

    Ok(Quote {
        length: raw.content.chars().count(),
        quote: raw.content,
        author: raw.author,
        category: category.to_string(),
        tags: raw.tags,
        source: Source::Live,
    })
}

fn fallback_quote() -> Quote {
    let canned = [
        (
            "The only way to do great work is to love what you do.",
            "Steve Jobs",
            "inspirational",
            ["inspirational", "work"],
        ),
        (
            "Innovation distinguishes between a leader and a follower.",
            "Steve Jobs",
            "success",
            ["success", "leadership"],
        ),
        (
            "Life is what happens to you while you're busy making other plans.",
            "John Lennon",
            "life",
            ["life", "wisdom"],
        ),
    ];

    let (quote, author, category, tags) = canned
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(canned[0]);

    Quote {
        quote: quote.to_string(),
        author: author.to_string(),
        category: category.to_string(),
        length: quote.chars().count(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        source: Source::Fallback,
    }
}
