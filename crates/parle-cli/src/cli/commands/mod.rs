//! CLI command handlers.

pub mod app;
pub mod auth;
pub mod config;
pub mod words;
