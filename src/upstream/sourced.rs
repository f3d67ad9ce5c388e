//! Live-or-fallback results for routes with canned content.

use serde::Serialize;

use crate::upstream::UpstreamError;

/// Where a payload came from.
///
/// Routes that can degrade to canned content return `Fallback` instead of
/// an error when their upstream fails.
#[derive(Debug, Clone, PartialEq)]
pub enum Sourced<T> {
    Live(T),
    Fallback(T),
}

/// Wire label for [`Sourced`], embedded in payloads as `source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Live,
    Fallback,
}

impl<T> Sourced<T> {
    /// Uses the live result when there is one, otherwise `fallback()`.
    pub fn or_fallback(
        live: Result<T, UpstreamError>,
        fallback: impl FnOnce(&UpstreamError) -> T,
    ) -> Self {
        match live {
            Ok(value) => Sourced::Live(value),
            Err(err) => Sourced::Fallback(fallback(&err)),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Sourced::Fallback(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Sourced::Live(value) | Sourced::Fallback(value) => value,
        }
    }
}
