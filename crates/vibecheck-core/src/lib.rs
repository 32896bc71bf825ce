//! VibeCheck Core Library
//!
//! Suite model and validation, check kinds, result aggregation, and the
//! async API client with its run lifecycle.

pub mod check;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod results;
pub mod suite;
