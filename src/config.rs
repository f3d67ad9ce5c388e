//! Configuration Module
//!
//! Loads server configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::upstream::UpstreamConfig;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Maximum number of cached response payloads
    pub max_cache_entries: usize,
    /// Background sweep interval in seconds
    pub cleanup_interval: u64,
    /// How long a closed rate-limit window is kept before it is swept, in seconds
    pub rate_record_grace: u64,
    /// Base of the links handed out by the URL shortener
    pub short_link_base: String,
    /// Third-party service endpoints
    pub upstream: UpstreamConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `MAX_CACHE_ENTRIES` - Cache capacity (default: 10000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `RATE_RECORD_GRACE` - Seconds a stale rate record survives (default: 3600)
    /// - `SHORT_LINK_BASE` - Short link prefix (default: https://ladybug.short)
    /// - `UPSTREAM_TIMEOUT` - Third-party request timeout in seconds (default: 10)
    /// - `OPENWEATHER_API_KEY` - Enables OpenWeatherMap instead of wttr.in
    /// - `COINGECKO_BASE_URL`, `QUOTABLE_BASE_URL`, `REDDIT_BASE_URL`,
    ///   `OPENWEATHER_BASE_URL`, `WTTR_BASE_URL`, `YOUTUBE_OEMBED_URL`,
    ///   `DUCKDUCKGO_BASE_URL`, `NEWS_FEED_BASE_URL` - upstream endpoint overrides
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let upstream = UpstreamConfig {
            coingecko_base_url: env_or("COINGECKO_BASE_URL", defaults.upstream.coingecko_base_url),
            quotable_base_url: env_or("QUOTABLE_BASE_URL", defaults.upstream.quotable_base_url),
            reddit_base_url: env_or("REDDIT_BASE_URL", defaults.upstream.reddit_base_url),
            openweather_base_url: env_or(
                "OPENWEATHER_BASE_URL",
                defaults.upstream.openweather_base_url,
            ),
            openweather_api_key: env::var("OPENWEATHER_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            wttr_base_url: env_or("WTTR_BASE_URL", defaults.upstream.wttr_base_url),
            youtube_oembed_url: env_or("YOUTUBE_OEMBED_URL", defaults.upstream.youtube_oembed_url),
            duckduckgo_base_url: env_or("DUCKDUCKGO_BASE_URL", defaults.upstream.duckduckgo_base_url),
            news_feed_base_url: env_or("NEWS_FEED_BASE_URL", defaults.upstream.news_feed_base_url),
            timeout_secs: parse_env_or("UPSTREAM_TIMEOUT", defaults.upstream.timeout_secs),
        };

        Self {
            server_port: parse_env_or("SERVER_PORT", defaults.server_port),
            max_cache_entries: parse_env_or("MAX_CACHE_ENTRIES", defaults.max_cache_entries),
            cleanup_interval: parse_env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            rate_record_grace: parse_env_or("RATE_RECORD_GRACE", defaults.rate_record_grace),
            short_link_base: env_or("SHORT_LINK_BASE", defaults.short_link_base),
            upstream,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            max_cache_entries: 10_000,
            cleanup_interval: 60,
            rate_record_grace: 3600,
            short_link_base: "https://ladybug.short".to_string(),
            upstream: UpstreamConfig::default(),
        }
    }
}

fn env_or(name: &str, default: String) -> String {
    env::var(name).ok().filter(|v| !v.is_empty()).unwrap_or(default)
}

fn parse_env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
