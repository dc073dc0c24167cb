//! Outbound chat messaging abstractions.

pub mod port;
