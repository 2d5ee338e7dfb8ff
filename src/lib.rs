//! rollcall — chat-based attendance bot, registration core.

pub mod channels;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod notify;
pub mod registration;
pub mod store;
