//! API Module
//!
//! Routing, request identity, CORS and the shared state every handler uses.
//!
//! # Endpoints
//! - `GET /` - Service index
//! - `GET /health` - Health check endpoint
//! - `GET /api/status` - Operational status and store sizes
//! - `/api/*` - Rate-limited routes, see [`crate::routes`]

pub mod cors;
pub mod handlers;
pub mod identity;
pub mod policy;
pub mod routes;
pub mod state;

pub use handlers::{
    health_handler, index_handler, method_not_allowed, not_found_handler, status_handler,
};
pub use identity::{resolve_identity, ClientIdentity};
pub use policy::RoutePolicy;
pub use routes::create_router;
pub use state::{respond, AppState};
