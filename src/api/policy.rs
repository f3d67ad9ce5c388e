//! Per-route rate limits and cache lifetimes.

use crate::limiter::HOUR_MS;

/// Quota and cache settings for one route.
///
/// `name` doubles as the namespace for the route's rate-limit and cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePolicy {
    pub name: &'static str,
    /// Requests allowed per window
    pub limit: u32,
    pub window_ms: u64,
    /// Cache lifetime in seconds, 0 for routes that never cache
    pub ttl_secs: u64,
}

impl RoutePolicy {
    pub const fn hourly(name: &'static str, limit: u32, ttl_secs: u64) -> Self {
        Self {
            name,
            limit,
            window_ms: HOUR_MS,
            ttl_secs,
        }
    }
}

// Limit classes
pub const CONSERVATIVE_LIMIT: u32 = 20;
pub const DEFAULT_LIMIT: u32 = 100;
pub const DOWNLOAD_LIMIT: u32 = 30;
pub const BULK_LIMIT: u32 = 50;

pub const PASSWORD: RoutePolicy = RoutePolicy::hourly("password", DEFAULT_LIMIT, 0);
pub const COLORS: RoutePolicy = RoutePolicy::hourly("colors", DEFAULT_LIMIT, 300);
pub const SHORTEN: RoutePolicy = RoutePolicy::hourly("shorten", BULK_LIMIT, 86_400);
pub const QUOTES: RoutePolicy = RoutePolicy::hourly("quotes", DEFAULT_LIMIT, 1_800);
pub const MEME: RoutePolicy = RoutePolicy::hourly("meme", BULK_LIMIT, 300);
pub const CRYPTO: RoutePolicy = RoutePolicy::hourly("crypto", DEFAULT_LIMIT, 300);
pub const WEATHER: RoutePolicy = RoutePolicy::hourly("weather", DEFAULT_LIMIT, 600);
pub const AI_CHAT: RoutePolicy = RoutePolicy::hourly("ai_chat", CONSERVATIVE_LIMIT, 1_800);
pub const YOUTUBE: RoutePolicy = RoutePolicy::hourly("youtube", DOWNLOAD_LIMIT, 300);
pub const QR: RoutePolicy = RoutePolicy::hourly("qr", DEFAULT_LIMIT, 3_600);
pub const NEWS: RoutePolicy = RoutePolicy::hourly("news", BULK_LIMIT, 900);
pub const SEARCH: RoutePolicy = RoutePolicy::hourly("search", BULK_LIMIT, 1_800);

/// Every rate-limited route, in the order they are documented.
pub const ALL: [RoutePolicy; 12] = [
    PASSWORD, COLORS, SHORTEN, QUOTES, MEME, CRYPTO, WEATHER, AI_CHAT, YOUTUBE, QR, NEWS, SEARCH,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_route_names_are_unique() {
        let names: HashSet<_> = ALL.iter().map(|p| p.name).collect();
        assert_eq!(names.len(), ALL.len());
    }

    #[test]
    fn test_hourly_window() {
        assert!(ALL.iter().all(|p| p.window_ms == 3_600_000));
        assert_eq!(AI_CHAT.limit, 20);
        assert_eq!(YOUTUBE.limit, 30);
        assert_eq!(NEWS.limit, 50);
        assert_eq!(SEARCH.ttl_secs, 1_800);
    }
}
