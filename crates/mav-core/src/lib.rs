//! Core domain + application logic for the MyAgentView backend.
//!
//! This crate is intentionally framework-agnostic. HTTP (axum), Telegram
//! (teloxide) and the Supabase store live behind ports (traits) implemented in
//! adapter crates.

pub mod authz;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod memory;
pub mod messaging;
pub mod notifications;
pub mod store;
pub mod webhook;

pub use errors::{Error, Result};
