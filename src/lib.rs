//! MediaBot - forum bot that answers movie and TV references with catalog
//! details.
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod forum;
pub mod jobs;
pub mod metadata;
pub mod monitor;
pub mod reply;
pub mod server;
