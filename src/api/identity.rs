//! Client Identity Resolver
//!
//! Derives the rate-limiting identity of a caller from request metadata.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};

/// Identity used when nothing better is available.
pub const LOOPBACK_IDENTITY: &str = "127.0.0.1";

/// Resolves the caller identity.
///
/// Priority: first entry of `x-forwarded-for`, then `x-real-ip`, then the
/// transport peer address, then [`LOOPBACK_IDENTITY`].
pub fn resolve_identity(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| LOOPBACK_IDENTITY.to_string())
}

/// Extractor yielding the resolved caller identity. Never rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(ClientIdentity(resolve_identity(&parts.headers, peer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    fn peer() -> Option<SocketAddr> {
        Some("192.168.1.20:51234".parse().unwrap())
    }

    #[test]
    fn test_forwarded_for_wins() {
        let h = headers(&[("x-forwarded-for", "203.0.113.7"), ("x-real-ip", "198.51.100.1")]);
        assert_eq!(resolve_identity(&h, peer()), "203.0.113.7");
    }

    #[test]
    fn test_forwarded_for_chain_uses_first_hop() {
        let h = headers(&[("x-forwarded-for", " 203.0.113.7 , 10.0.0.1, 10.0.0.2")]);
        assert_eq!(resolve_identity(&h, None), "203.0.113.7");
    }

    #[test]
    fn test_real_ip_second() {
        let h = headers(&[("x-real-ip", "198.51.100.1")]);
        assert_eq!(resolve_identity(&h, peer()), "198.51.100.1");
    }

    #[test]
    fn test_empty_headers_are_skipped() {
        let h = headers(&[("x-forwarded-for", ""), ("x-real-ip", "  ")]);
        assert_eq!(resolve_identity(&h, peer()), "192.168.1.20");
    }

    #[test]
    fn test_peer_address_third() {
        assert_eq!(resolve_identity(&HeaderMap::new(), peer()), "192.168.1.20");
    }

    #[test]
    fn test_loopback_fallback() {
        assert_eq!(resolve_identity(&HeaderMap::new(), None), LOOPBACK_IDENTITY);
    }

    #[tokio::test]
    async fn test_extractor_reads_connect_info() {
        let request = axum::http::Request::builder()
            .extension(ConnectInfo::<SocketAddr>("10.1.2.3:8080".parse().unwrap()))
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let ClientIdentity(identity) = ClientIdentity::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(identity, "10.1.2.3");
    }
}
