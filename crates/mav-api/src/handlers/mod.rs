//! Request handlers.

pub mod agents;
pub mod health;
pub mod notifications;
pub mod webhook;
