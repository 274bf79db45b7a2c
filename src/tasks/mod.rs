//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Fetch cache sweep: drops stale layer bytes at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
