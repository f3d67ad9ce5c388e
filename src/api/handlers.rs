//! Service Handlers
//!
//! Index, health and status endpoints plus the shared 404/405 fallbacks.

use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::api::{policy, respond, AppState, ClientIdentity, RoutePolicy};
use crate::error::ApiError;
use crate::models::{CacheStatus, Envelope, HealthResponse, StatusResponse};

/// Handler for GET /
///
/// Describes every endpoint, the rate-limit classes and the envelope shape.
pub async fn index_handler() -> Json<Value> {
    let endpoints: Vec<Value> = policy::ALL
        .iter()
        .map(|p| {
            json!({
                "name": p.name,
                "path": route_path(p),
                "rate_limit": format!("{} requests per hour", p.limit),
                "cache_ttl_secs": p.ttl_secs,
            })
        })
        .collect();

    Json(json!({
        "name": "Freebie API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Free utility APIs: prices, weather, quotes, memes and local generators",
        "endpoints": endpoints,
        "usage": {
            "rate_limits": {
                "default": format!("{} requests per hour", policy::DEFAULT_LIMIT),
                "ai_chat": format!("{} requests per hour", policy::CONSERVATIVE_LIMIT),
                "downloads": format!("{} requests per hour", policy::DOWNLOAD_LIMIT),
                "bulk": format!("{} requests per hour", policy::BULK_LIMIT),
            },
            "response_format": {
                "success": true,
                "timestamp": "2024-01-01T00:00:00.000Z",
                "data": "Response data here",
                "error": null,
                "statusCode": 200,
            }
        }
    }))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.started_at.elapsed().as_secs()))
}

/// Handler for GET /api/status
///
/// Reports which routes are served and the current size of both stores.
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let cache = {
        let store = state.cache.read().await;
        CacheStatus::new(store.stats(), store.max_entries())
    };
    let tracked_clients = state.limiter.lock().await.len();
    let weather_source = if state.config.upstream.openweather_api_key.is_some() {
        "openweathermap"
    } else {
        "wttr.in"
    };

    Json(StatusResponse::operational(
        policy::ALL.iter().map(|p| p.name),
        weather_source,
        cache,
        tracked_clients,
    ))
}

/// Router-wide fallback for unknown paths.
pub async fn not_found_handler() -> Response {
    Envelope::failure(ApiError::NotFound.to_string(), StatusCode::NOT_FOUND).into_response()
}

type BoxedResponse = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Builds the wrong-method fallback for a route.
///
/// The request still counts against the route's quota before being
/// rejected with 405.
pub fn method_not_allowed(
    policy: &'static RoutePolicy,
) -> impl Fn(State<AppState>, ClientIdentity) -> BoxedResponse + Clone + Send + Sync + 'static {
    move |State(state): State<AppState>, ClientIdentity(identity): ClientIdentity| -> BoxedResponse {
        Box::pin(async move {
            let result = match state.check_rate(policy, &identity).await {
                Ok(()) => Err(ApiError::MethodNotAllowed),
                Err(err) => Err(err),
            };
            respond(policy, &identity, result)
        })
    }
}

fn route_path(policy: &RoutePolicy) -> String {
    match policy.name {
        "ai_chat" => "/api/ai/chat".to_string(),
        name => format!("/api/{name}"),
    }
}
