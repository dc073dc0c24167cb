//! HTTP surface of the MyAgentView backend (axum).
//!
//! Routes, authentication/authorization middleware and the Telegram webhook
//! endpoint. Business rules live in `mav-core`.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{create_router, serve};
pub use state::AppState;
