//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Sweeper: drops expired cache entries and stale rate-limit records

mod cleanup;

pub use cleanup::spawn_cleanup_task;
