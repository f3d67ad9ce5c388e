//! API Routes
//!
//! Configures the Axum router with every endpoint, the CORS gate and
//! request tracing.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::cors::cors_gate;
use super::handlers::{
    health_handler, index_handler, method_not_allowed, not_found_handler, status_handler,
};
use super::policy;
use super::state::AppState;
use crate::routes::{
    chat::chat_handler, colors::colors_handler, crypto::crypto_handler, meme::meme_handler,
    news::news_handler, password::password_handler, qr::qr_handler, quotes::quotes_handler,
    search::search_handler, shorten::shorten_handler, weather::weather_handler,
    youtube::youtube_handler,
};

/// Creates the main router with all endpoints configured.
///
/// Each API route answers any other method with a 405 envelope that still
/// counts against its quota. Unknown paths get a 404 envelope.
///
/// # Middleware
/// - CORS: headers on every response, `OPTIONS` answered before routing
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/status", get(status_handler))
        .route(
            "/api/password",
            get(password_handler).fallback(method_not_allowed(&policy::PASSWORD)),
        )
        .route(
            "/api/colors",
            get(colors_handler).fallback(method_not_allowed(&policy::COLORS)),
        )
        .route(
            "/api/shorten",
            get(shorten_handler).fallback(method_not_allowed(&policy::SHORTEN)),
        )
        .route(
            "/api/quotes",
            get(quotes_handler).fallback(method_not_allowed(&policy::QUOTES)),
        )
        .route(
            "/api/meme",
            get(meme_handler).fallback(method_not_allowed(&policy::MEME)),
        )
        .route(
            "/api/crypto",
            get(crypto_handler).fallback(method_not_allowed(&policy::CRYPTO)),
        )
        .route(
            "/api/weather",
            get(weather_handler).fallback(method_not_allowed(&policy::WEATHER)),
        )
        .route(
            "/api/ai/chat",
            post(chat_handler).fallback(method_not_allowed(&policy::AI_CHAT)),
        )
        .route(
            "/api/youtube",
            get(youtube_handler).fallback(method_not_allowed(&policy::YOUTUBE)),
        )
        .route(
            "/api/qr",
            get(qr_handler).fallback(method_not_allowed(&policy::QR)),
        )
        .route(
            "/api/news",
            get(news_handler).fallback(method_not_allowed(&policy::NEWS)),
        )
        .route(
            "/api/search",
            get(search_handler).fallback(method_not_allowed(&policy::SEARCH)),
        )
        .fallback(not_found_handler)
        .layer(middleware::from_fn(cors_gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
