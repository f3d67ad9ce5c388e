//! News headlines (GET /api/news)
//!
//! Reads the BBC RSS feed for a category and returns its newest items.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Response,
};
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::{events::Event, Reader};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::api::{policy::NEWS, respond, AppState, ClientIdentity};
use crate::error::{ApiError, Result};
use crate::models::requests::{clamped_number, or_default};
use crate::models::NewsQuery;
use crate::routes::query_params;
use crate::upstream::{UpstreamClient, UpstreamError};

const UNAVAILABLE: &str = "News service unavailable";
const SOURCE: &str = "BBC News";

/// Category name to feed path on the feed host. Unknown names read `general`.
const FEEDS: &[(&str, &str)] = &[
    ("general", "news/rss.xml"),
    ("technology", "news/technology/rss.xml"),
    ("business", "news/business/rss.xml"),
    ("sports", "sport/rss.xml"),
    ("health", "news/health/rss.xml"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub description: String,
    pub url: String,
    pub published_at: Option<String>,
    pub source: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Headlines {
    pub category: &'static str,
    pub total_results: usize,
    pub articles: Vec<Article>,
}

/// Handler for GET /api/news
pub async fn news_handler(
    State(state): State<AppState>,
    ClientIdentity(identity): ClientIdentity,
    query: std::result::Result<Query<NewsQuery>, QueryRejection>,
) -> Response {
    let result = news(&state, &identity, query).await;
    respond(&NEWS, &identity, result)
}

async fn news(
    state: &AppState,
    identity: &str,
    query: std::result::Result<Query<NewsQuery>, QueryRejection>,
) -> Result<Value> {
    state.check_rate(&NEWS, identity).await?;
    let query = query_params(query)?;

    let (category, feed) = feed_for(or_default(&query.category, "general"));
    let limit = clamped_number(&query.limit, "limit", 10, 1, 50)? as usize;

    let key = format!("{category}:{limit}");
    state
        .cached(&NEWS, &key, || async {
            let headlines = fetch_headlines(&state.upstream, category, feed, limit)
                .await
                .map_err(|e| ApiError::upstream(UNAVAILABLE, e))?;
            serde_json::to_value(headlines).map_err(|e| ApiError::internal(UNAVAILABLE, e.to_string()))
        })
        .await
}

fn feed_for(category: &str) -> (&'static str, &'static str) {
    let wanted = category.to_ascii_lowercase();
    FEEDS
        .iter()
        .find(|(name, _)| *name == wanted)
        .copied()
        .unwrap_or(FEEDS[0])
}

/// Fetches the feed at `feed` and keeps at most `limit` items.
pub async fn fetch_headlines(
    upstream: &UpstreamClient,
    category: &'static str,
    feed: &str,
    limit: usize,
) -> std::result::Result<Headlines, UpstreamError> {
    let url = format!("{}/{feed}", upstream.config().news_feed_base_url);
    let xml = upstream.get_text(&url, &[]).await?;

    let articles = parse_items(&xml, limit);
    Ok(Headlines {
        category,
        total_results: articles.len(),
        articles,
    })
}

#[derive(Debug, Clone, Copy)]
enum ItemField {
    Title,
    Description,
    Link,
    PubDate,
}

#[derive(Debug, Default)]
struct RawItem {
    title: String,
    description: String,
    link: String,
    pub_date: String,
}

impl RawItem {
    fn field_mut(&mut self, field: ItemField) -> &mut String {
        match field {
            ItemField::Title => &mut self.title,
            ItemField::Description => &mut self.description,
            ItemField::Link => &mut self.link,
            ItemField::PubDate => &mut self.pub_date,
        }
    }

    fn into_article(self) -> Article {
        Article {
            title: self.title.trim().to_string(),
            description: strip_tags(&self.description).trim().to_string(),
            url: self.link.trim().to_string(),
            published_at: DateTime::parse_from_rfc2822(self.pub_date.trim())
                .ok()
                .map(|date| date.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true)),
            source: SOURCE,
        }
    }
}

/// Collects `<item>` entries from an RSS document. Parsing stops at the
/// first malformed element and keeps what was read before it.
fn parse_items(xml: &str, limit: usize) -> Vec<Article> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut articles = Vec::new();
    let mut buf = Vec::new();
    let mut item: Option<RawItem> = None;
    let mut field: Option<ItemField> = None;

    while articles.len() < limit {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"item" => item = Some(RawItem::default()),
                name if item.is_some() => {
                    field = match name {
                        b"title" => Some(ItemField::Title),
                        b"description" => Some(ItemField::Description),
                        b"link" => Some(ItemField::Link),
                        b"pubDate" => Some(ItemField::PubDate),
                        _ => None,
                    };
                },
                _ => {},
            },
            Ok(Event::Text(e)) => {
                if let (Some(raw), Some(field)) = (item.as_mut(), field) {
                    if let Ok(text) = e.unescape() {
                        raw.field_mut(field).push_str(&text);
                    }
                }
            },
            Ok(Event::CData(e)) => {
                if let (Some(raw), Some(field)) = (item.as_mut(), field) {
                    if let Ok(text) = std::str::from_utf8(e.as_ref()) {
                        raw.field_mut(field).push_str(text);
                    }
                }
            },
            Ok(Event::End(e)) => {
                field = None;
                if e.name().as_ref() == b"item" {
                    if let Some(raw) = item.take() {
                        articles.push(raw.into_article());
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                debug!(error = ?e, "XML parsing error in news feed");
                break;
            },
            _ => {},
        }
        buf.clear();
    }

    articles
}

/// Drops every `<...>` run; a `<` with no closing `>` is kept as text.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(open) = rest.find('<') {
        let Some(close) = rest[open..].find('>') else {
            break;
        };
        out.push_str(&rest[..open]);
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::UpstreamConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>BBC News</title>
    <link>https://www.bbc.co.uk/news</link>
    <item>
      <title><![CDATA[Markets rally after rate cut]]></title>
      <description><![CDATA[<p>Shares rose <b>sharply</b> on Monday.</p>]]></description>
      <link>https://www.bbc.co.uk/news/business-1</link>
      <pubDate>Mon, 06 Jan 2025 09:30:00 GMT</pubDate>
    </item>
    <item>
      <title>Rain &amp; wind expected</title>
      <description>Forecasters warn of storms.</description>
      <link>https://www.bbc.co.uk/news/uk-2</link>
      <pubDate>not a date</pubDate>
    </item>
    <item>
      <title>Third story</title>
      <link>https://www.bbc.co.uk/news/uk-3</link>
    </item>
  </channel>
</rss>"#;

    fn client_for(server: &MockServer) -> UpstreamClient {
        UpstreamClient::new(UpstreamConfig {
            news_feed_base_url: server.uri(),
            ..UpstreamConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_parse_items_reads_item_fields_only() {
        let articles = parse_items(FEED, 10);

        assert_eq!(articles.len(), 3);
        assert_eq!(articles[0].title, "Markets rally after rate cut");
        assert_eq!(articles[0].description, "Shares rose sharply on Monday.");
        assert_eq!(articles[0].url, "https://www.bbc.co.uk/news/business-1");
        assert_eq!(
            articles[0].published_at.as_deref(),
            Some("2025-01-06T09:30:00.000Z")
        );
        assert_eq!(articles[1].title, "Rain & wind expected");
        assert_eq!(articles[1].published_at, None);
        assert_eq!(articles[2].description, "");
    }

    #[test]
    fn test_parse_items_honours_limit() {
        let articles = parse_items(FEED, 2);
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[1].url, "https://www.bbc.co.uk/news/uk-2");
    }

    #[test]
    fn test_parse_items_on_non_feed() {
        assert!(parse_items("<html><body>maintenance</body></html>", 10).is_empty());
        assert!(parse_items("", 10).is_empty());
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>a <i>b</i></p>"), "a b");
        assert_eq!(strip_tags("1 < 2"), "1 < 2");
    }

    #[test]
    fn test_unknown_category_reads_general_feed() {
        assert_eq!(feed_for("Technology"), ("technology", "news/technology/rss.xml"));
        assert_eq!(feed_for("sports"), ("sports", "sport/rss.xml"));
        assert_eq!(feed_for("gossip"), ("general", "news/rss.xml"));
    }

    #[tokio::test]
    async fn test_fetch_headlines() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news/business/rss.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
            .mount(&server)
            .await;

        let headlines = fetch_headlines(&client_for(&server), "business", "news/business/rss.xml", 1)
            .await
            .unwrap();

        assert_eq!(headlines.category, "business");
        assert_eq!(headlines.total_results, 1);
        assert_eq!(headlines.articles[0].source, "BBC News");
    }

    #[tokio::test]
    async fn test_feed_outage_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let result = fetch_headlines(&client_for(&server), "general", "news/rss.xml", 10).await;
        assert!(matches!(result, Err(UpstreamError::Status(502))));
    }
}
