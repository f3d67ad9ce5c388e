//! Upstream Module
//!
//! Access to the free third-party services behind the proxy routes.

mod client;
mod error;
mod sourced;

pub use client::{UpstreamClient, UpstreamConfig};
pub use error::UpstreamError;
pub use sourced::{Source, Sourced};
