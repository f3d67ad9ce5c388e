//! YouTube metadata (GET /api/youtube)
//!
//! Resolves a video through the public oEmbed endpoint and returns a demo
//! download link. Nothing is actually downloaded or transcoded.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Response,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::api::{policy::YOUTUBE, respond, AppState, ClientIdentity};
use crate::error::{ApiError, Result};
use crate::models::requests::{or_default, required};
use crate::models::YoutubeQuery;
use crate::routes::query_params;
use crate::upstream::{UpstreamClient, UpstreamError};

const FAILED: &str = "Failed to process YouTube URL";
const VIDEO_ID_LENGTH: usize = 11;
const DOWNLOAD_BASE: &str = "https://ladybug-api.vercel.app/api/youtube/download";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub title: String,
    pub author: String,
    pub duration: &'static str,
    pub thumbnail: String,
    pub download_url: String,
    pub format: String,
    pub quality: &'static str,
    pub size: &'static str,
    pub video_id: String,
}

#[derive(Debug, Deserialize)]
struct OEmbed {
    title: String,
    #[serde(default)]
    author_name: String,
    #[serde(default)]
    thumbnail_url: String,
}

/// Handler for GET /api/youtube
pub async fn youtube_handler(
    State(state): State<AppState>,
    ClientIdentity(identity): ClientIdentity,
    query: std::result::Result<Query<YoutubeQuery>, QueryRejection>,
) -> Response {
    let result = video(&state, &identity, query).await;
    respond(&YOUTUBE, &identity, result)
}

async fn video(
    state: &AppState,
    identity: &str,
    query: std::result::Result<Query<YoutubeQuery>, QueryRejection>,
) -> Result<Value> {
    state.check_rate(&YOUTUBE, identity).await?;
    let query = query_params(query)?;

    let raw = required(&query.url, "URL parameter is required")?;
    let video_id =
        extract_video_id(raw).ok_or_else(|| ApiError::validation("Invalid YouTube URL"))?;
    let format = or_default(&query.format, "mp4").to_ascii_lowercase();

    let key = format!("{video_id}:{format}");
    state
        .cached(&YOUTUBE, &key, || async {
            let info = fetch_video_info(&state.upstream, &video_id, &format)
                .await
                .map_err(|e| ApiError::upstream(FAILED, e))?;
            serde_json::to_value(info).map_err(|e| ApiError::internal(FAILED, e.to_string()))
        })
        .await
}

/// Pulls the 11-character video id out of watch, short, embed and
/// youtu.be links. A missing scheme is tolerated.
pub fn extract_video_id(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let url = Url::parse(raw)
        .or_else(|_| Url::parse(&format!("https://{raw}")))
        .ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    let candidate = if host == "youtu.be" {
        segments.next().map(str::to_string)
    } else if host == "youtube.com" || host.ends_with(".youtube.com") {
        match segments.next() {
            Some("watch") => url
                .query_pairs()
                .find(|(name, _)| name == "v")
                .map(|(_, value)| value.into_owned()),
            Some("embed" | "shorts" | "v" | "e" | "live") => segments.next().map(str::to_string),
            _ => None,
        }
    } else {
        None
    };

    candidate.filter(|id| is_video_id(id))
}

fn is_video_id(id: &str) -> bool {
    id.len() == VIDEO_ID_LENGTH
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Looks the video up through oEmbed and builds the download record.
pub async fn fetch_video_info(
    upstream: &UpstreamClient,
    video_id: &str,
    format: &str,
) -> std::result::Result<VideoInfo, UpstreamError> {
    let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
    let oembed: OEmbed = upstream
        .get_json(
            &upstream.config().youtube_oembed_url,
            &[("url", watch_url.as_str()), ("format", "json")],
        )
        .await?;

    Ok(VideoInfo {
        title: oembed.title,
        author: oembed.author_name,
        duration: "Unknown",
        thumbnail: oembed.thumbnail_url,
        download_url: format!("{DOWNLOAD_BASE}?id={video_id}&format={format}"),
        quality: if format == "mp3" { "128kbps" } else { "720p" },
        format: format.to_string(),
        size: "Variable",
        video_id: video_id.to_string(),
    })
}
