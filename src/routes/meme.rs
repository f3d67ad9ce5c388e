//! Memes (GET /api/meme)
//!
//! Picks a random safe image post from a subreddit's hot listing. An
//! unreachable or empty listing degrades to a canned meme.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Response,
};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::{policy::MEME, respond, AppState, ClientIdentity};
use crate::cache::{current_timestamp_ms, time_bucket};
use crate::error::{ApiError, Result};
use crate::models::requests::or_default;
use crate::models::MemeQuery;
use crate::routes::query_params;
use crate::upstream::{Source, Sourced, UpstreamClient, UpstreamError};

const LISTING_LIMIT: &str = "50";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meme {
    pub title: String,
    pub url: String,
    pub thumbnail: String,
    pub upvotes: i64,
    pub comments: i64,
    pub created: i64,
    pub subreddit: String,
    pub source: Source,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: String,
    url: String,
    #[serde(default)]
    thumbnail: String,
    #[serde(default)]
    ups: i64,
    #[serde(default)]
    num_comments: i64,
    #[serde(default)]
    created_utc: f64,
    post_hint: Option<String>,
    #[serde(default)]
    over_18: bool,
}

impl Post {
    fn is_safe_image(&self) -> bool {
        self.post_hint.as_deref() == Some("image") && !self.over_18
    }
}

/// Maps a meme type to its subreddit. Unknown types read r/memes.
pub fn subreddit_for(kind: &str) -> &'static str {
    match kind.to_ascii_lowercase().as_str() {
        "programming" => "ProgrammerHumor",
        "wholesome" => "wholesomememes",
        "dank" => "dankmemes",
        "funny" => "funny",
        "cats" => "catmemes",
        _ => "memes",
    }
}

/// Handler for GET /api/meme
pub async fn meme_handler(
    State(state): State<AppState>,
    ClientIdentity(identity): ClientIdentity,
    query: std::result::Result<Query<MemeQuery>, QueryRejection>,
) -> Response {
    let result = meme(&state, &identity, query).await;
    respond(&MEME, &identity, result)
}

async fn meme(
    state: &AppState,
    identity: &str,
    query: std::result::Result<Query<MemeQuery>, QueryRejection>,
) -> Result<Value> {
    state.check_rate(&MEME, identity).await?;
    let query = query_params(query)?;

    let subreddit = subreddit_for(or_default(&query.kind, "random"));
    let key = format!(
        "{subreddit}:{}",
        time_bucket(current_timestamp_ms(), MEME.ttl_secs)
    );
    state
        .cached(&MEME, &key, || async {
            let meme = fetch_meme(&state.upstream, subreddit).await;
            if meme.is_fallback() {
                warn!(route = MEME.name, client = identity, subreddit, "reddit unavailable, serving fallback");
            }
            serde_json::to_value(meme.into_inner())
                .map_err(|e| ApiError::internal("Meme service unavailable", e.to_string()))
        })
        .await
}

/// Fetches one meme from `subreddit`, falling back to the canned set.
pub async fn fetch_meme(upstream: &UpstreamClient, subreddit: &str) -> Sourced<Meme> {
    let live = fetch_live(upstream, subreddit).await;
    Sourced::or_fallback(live, |err| {
        debug!(error = %err, subreddit, "reddit request failed");
        fallback_meme()
    })
}

async fn fetch_live(
    upstream: &UpstreamClient,
    subreddit: &str,
) -> std::result::Result<Meme, UpstreamError> {
    let url = format!(
        "{}/r/{subreddit}/hot.json",
        upstream.config().reddit_base_url.trim_end_matches('/')
    );
    let listing: Listing = upstream.get_json(&url, &[("limit", LISTING_LIMIT)]).await?;

    let candidates: Vec<Post> = listing
        .data
        .children
        .into_iter()
        .map(|child| child.data)
        .filter(Post::is_safe_image)
        .collect();

    let post = candidates
        .choose(&mut rand::thread_rng())
        .ok_or_else(|| UpstreamError::NotFound(format!("no image posts in r/{subreddit}")))?;

    Ok(Meme {
        title: post.title.clone(),
        url: post.url.clone(),
        thumbnail: post.thumbnail.clone(),
        upvotes: post.ups,
        comments: post.num_comments,
        created: post.created_utc as i64,
        subreddit: subreddit.to_string(),
        source: Source::Live,
    })
}

fn fallback_meme() -> Meme {
    let canned = [
        (
            "When the code works on the first try",
            "https://i.imgflip.com/1bij.jpg",
        ),
        (
            "Debugging at 3am",
            "https://i.imgflip.com/30b1gx.jpg",
        ),
        (
            "It works on my machine",
            "https://i.imgflip.com/1ur9b0.jpg",
        ),
    ];

    let (title, url) = canned
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(canned[0]);

    Meme {
        title: title.to_string(),
        url: url.to_string(),
        thumbnail: url.to_string(),
        upvotes: 0,
        comments: 0,
        created: 0,
        subreddit: "fallback".to_string(),
        source: Source::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::UpstreamConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> UpstreamClient {
        UpstreamClient::new(UpstreamConfig {
            reddit_base_url: server.uri(),
            ..UpstreamConfig::default()
        })
        .unwrap()
    }

    fn post(title: &str, hint: Option<&str>, nsfw: bool) -> Value {
        json!({
            "title": title,
            "url": format!("https://i.redd.it/{title}.png"),
            "thumbnail": "https://b.thumbs.redditmedia.com/t.jpg",
            "ups": 420,
            "num_comments": 12,
            "created_utc": 1700000000.0,
            "post_hint": hint,
            "over_18": nsfw
        })
    }

    #[test]
    fn test_subreddit_mapping() {
        assert_eq!(subreddit_for("programming"), "ProgrammerHumor");
        assert_eq!(subreddit_for("CATS"), "catmemes");
        assert_eq!(subreddit_for("random"), "memes");
        assert_eq!(subreddit_for("whatever"), "memes");
    }

    #[tokio::test]
    async fn test_only_safe_images_are_picked() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/ProgrammerHumor/hot.json"))
            .and(query_param("limit", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"children": [
                    {"data": post("text", Some("self"), false)},
                    {"data": post("nsfw", Some("image"), true)},
                    {"data": post("good", Some("image"), false)}
                ]}
            })))
            .mount(&server)
            .await;

        let meme = fetch_meme(&client_for(&server), "ProgrammerHumor").await;

        let Sourced::Live(meme) = meme else {
            panic!("expected live meme");
        };
        assert_eq!(meme.title, "good");
        assert_eq!(meme.upvotes, 420);
        assert_eq!(meme.created, 1_700_000_000);
        assert_eq!(meme.subreddit, "ProgrammerHumor");
    }

    #[tokio::test]
    async fn test_empty_listing_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"children": [{"data": post("text", None, false)}]}
            })))
            .mount(&server)
            .await;

        let meme = fetch_meme(&client_for(&server), "memes").await;

        assert!(meme.is_fallback());
        let meme = meme.into_inner();
        assert_eq!(meme.subreddit, "fallback");
        assert_eq!(meme.source, Source::Fallback);
    }

    #[tokio::test]
    async fn test_upstream_error_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        assert!(fetch_meme(&client_for(&server), "memes").await.is_fallback());
    }
}
