//! Telegram webhook handling: payload types, command classification and the
//! dispatcher that applies registration side effects.

pub mod command;
pub mod dispatcher;
pub mod types;

pub use command::{Command, UpdateKind};
pub use dispatcher::{Dispatched, WebhookDispatcher};
pub use types::Update;
