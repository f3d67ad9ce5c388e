//! Route Handlers
//!
//! One module per endpoint. Every handler follows the same sequence: count
//! the request against the route quota, validate input, then serve from the
//! cache or do the route's single unit of work.
//!
//! # Endpoints
//! - `GET /api/password` - Password generator
//! - `GET /api/colors` - Color palette generator
//! - `GET /api/shorten` - URL shortener
//! - `GET /api/quotes` - Quotes (quotable.io, canned fallback)
//! - `GET /api/meme` - Memes (reddit, canned fallback)
//! - `GET /api/crypto` - Cryptocurrency prices (CoinGecko)
//! - `GET /api/weather` - Current weather (OpenWeatherMap or wttr.in)
//! - `POST /api/ai/chat` - Rule-based chat replies
//! - `GET /api/youtube` - YouTube metadata and demo download link
//! - `GET /api/qr` - QR code generator (PNG data URL or SVG)
//! - `GET /api/news` - BBC headlines by category
//! - `GET /api/search` - DuckDuckGo instant answers

pub mod chat;
pub mod colors;
pub mod crypto;
pub mod meme;
pub mod news;
pub mod password;
pub mod qr;
pub mod quotes;
pub mod search;
pub mod shorten;
pub mod weather;
pub mod youtube;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    Json,
};
use tracing::debug;

use crate::error::{ApiError, Result};

/// Unwraps extracted query parameters, turning a malformed query string
/// into a 400. The extractor's own text stays in the log.
pub(crate) fn query_params<T>(query: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    query.map(|Query(params)| params).map_err(|rejection| {
        debug!(detail = %rejection.body_text(), "Rejected query string");
        ApiError::validation("Invalid query parameters")
    })
}

/// Unwraps an extracted JSON body with a fixed message per rejection kind.
pub(crate) fn json_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(value)| value).map_err(|rejection| {
        debug!(detail = %rejection.body_text(), "Rejected JSON body");
        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => "Content-Type must be application/json",
            JsonRejection::JsonSyntaxError(_) => "Request body must be valid JSON",
            JsonRejection::JsonDataError(_) => "Request body has the wrong shape",
            _ => "Invalid request body",
        };
        ApiError::validation(message)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        extract::FromRequest,
        http::{header, Request},
    };
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[allow(dead_code)]
        name: Option<String>,
    }

    fn json_request(content_type: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_json_body_hides_deserializer_detail() {
        let extracted =
            Json::<Sample>::from_request(json_request("application/json", r#"{"name": 5}"#), &()).await;

        let err = json_body(extracted).unwrap_err();
        assert_eq!(err.to_string(), "Request body has the wrong shape");
    }

    #[tokio::test]
    async fn test_json_body_names_the_rejection_kind() {
        let syntax =
            Json::<Sample>::from_request(json_request("application/json", "{not json"), &()).await;
        assert_eq!(json_body(syntax).unwrap_err().to_string(), "Request body must be valid JSON");

        let content_type =
            Json::<Sample>::from_request(json_request("text/plain", "{}"), &()).await;
        assert_eq!(
            json_body(content_type).unwrap_err().to_string(),
            "Content-Type must be application/json"
        );
    }

    #[tokio::test]
    async fn test_query_params_hides_deserializer_detail() {
        #[derive(Debug, Deserialize)]
        struct Numeric {
            #[allow(dead_code)]
            n: u32,
        }
        let uri: axum::http::Uri = "/?n=abc".parse().unwrap();
        let err = query_params(Query::<Numeric>::try_from_uri(&uri)).unwrap_err();

        assert_eq!(err.to_string(), "Invalid query parameters");
    }
}
