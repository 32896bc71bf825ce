//! Command implementations for vibe

pub mod account;
pub mod check;
pub mod config;
pub mod dispatch;
pub mod render;
pub mod runs;
pub mod suite;
pub mod validate;
