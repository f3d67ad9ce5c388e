//! Request and Response models for the API
//!
//! The response envelope plus the DTOs used for serializing and
//! deserializing HTTP bodies.

pub mod envelope;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use envelope::Envelope;
pub use requests::{
    ChatRequest, ColorsQuery, CryptoQuery, MemeQuery, NewsQuery, PasswordQuery, QrQuery,
    QuotesQuery, SearchQuery, ShortenQuery, WeatherQuery, YoutubeQuery,
};
pub use responses::{CacheStatus, HealthResponse, StatusResponse};
