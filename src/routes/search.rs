//! Web search (GET /api/search)
//!
//! Results come from the DuckDuckGo Instant Answer API. A query with no
//! instant answer, abstract or related topic still gets one result that
//! links to a full DuckDuckGo search.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Response,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::form_urlencoded;

use crate::api::{policy::SEARCH, respond, AppState, ClientIdentity};
use crate::error::{ApiError, Result};
use crate::models::requests::{clamped_number, required};
use crate::models::SearchQuery;
use crate::routes::query_params;
use crate::upstream::{UpstreamClient, UpstreamError};

const UNAVAILABLE: &str = "Search service unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    InstantAnswer,
    Abstract,
    RelatedTopic,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ResultKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub total_results: usize,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct InstantAnswer {
    answer: String,
    #[serde(rename = "Abstract")]
    summary: String,
    #[serde(rename = "AbstractURL")]
    abstract_url: String,
    heading: String,
    related_topics: Vec<RelatedTopic>,
}

/// Grouped topics carry `Topics` instead of `Text`; those are skipped.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RelatedTopic {
    #[serde(rename = "Text")]
    text: Option<String>,
    #[serde(rename = "FirstURL")]
    first_url: Option<String>,
}

/// Handler for GET /api/search
pub async fn search_handler(
    State(state): State<AppState>,
    ClientIdentity(identity): ClientIdentity,
    query: std::result::Result<Query<SearchQuery>, QueryRejection>,
) -> Response {
    let result = search(&state, &identity, query).await;
    respond(&SEARCH, &identity, result)
}

async fn search(
    state: &AppState,
    identity: &str,
    query: std::result::Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Value> {
    state.check_rate(&SEARCH, identity).await?;
    let query = query_params(query)?;

    let q = required(&query.q, "Query parameter is required")?;
    let limit = clamped_number(&query.limit, "limit", 10, 1, 20)? as usize;

    let key = format!("{limit}:{}", q.to_lowercase());
    state
        .cached(&SEARCH, &key, || async {
            let results = fetch_results(&state.upstream, q, limit)
                .await
                .map_err(|e| ApiError::upstream(UNAVAILABLE, e))?;
            serde_json::to_value(results).map_err(|e| ApiError::internal(UNAVAILABLE, e.to_string()))
        })
        .await
}

/// Queries DuckDuckGo and flattens the answer into at most `limit` results.
pub async fn fetch_results(
    upstream: &UpstreamClient,
    query: &str,
    limit: usize,
) -> std::result::Result<SearchResults, UpstreamError> {
    let url = format!("{}/", upstream.config().duckduckgo_base_url);
    let answer: InstantAnswer = upstream
        .get_json(
            &url,
            &[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ],
        )
        .await?;

    let mut results = flatten(answer, limit);
    if results.is_empty() {
        results.push(fallback_result(query));
    }

    Ok(SearchResults {
        query: query.to_string(),
        total_results: results.len(),
        results,
    })
}

fn flatten(answer: InstantAnswer, limit: usize) -> Vec<SearchResult> {
    let link = if answer.abstract_url.is_empty() {
        "#".to_string()
    } else {
        answer.abstract_url.clone()
    };

    let mut results = Vec::new();
    if !answer.answer.is_empty() {
        results.push(SearchResult {
            title: "Instant Answer".to_string(),
            snippet: answer.answer,
            url: link.clone(),
            kind: ResultKind::InstantAnswer,
        });
    }
    if !answer.summary.is_empty() {
        let title = if answer.heading.is_empty() {
            "Information".to_string()
        } else {
            answer.heading
        };
        results.push(SearchResult {
            title,
            snippet: answer.summary,
            url: link,
            kind: ResultKind::Abstract,
        });
    }

    let topics = answer.related_topics.into_iter().filter_map(|topic| {
        let text = topic.text.filter(|t| !t.is_empty())?;
        let url = topic.first_url.filter(|u| !u.is_empty())?;
        let title = match text.split(" - ").next() {
            Some(head) if !head.is_empty() => head.to_string(),
            _ => "Related Topic".to_string(),
        };
        Some(SearchResult {
            title,
            snippet: text,
            url,
            kind: ResultKind::RelatedTopic,
        })
    });
    results.extend(topics);

    results.truncate(limit);
    results
}

fn fallback_result(query: &str) -> SearchResult {
    let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
    SearchResult {
        title: "Search Results".to_string(),
        snippet: format!("Search results for \"{query}\". Try refining your search query."),
        url: format!("https://duckduckgo.com/?q={encoded}"),
        kind: ResultKind::Fallback,
    }
}
