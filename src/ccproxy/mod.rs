//! # Chat Completion Proxy (ccproxy) Module
//!
//! This module relays chat completion requests to a single upstream and answers
//! in the OpenAI `chat.completion` format, either as one JSON object or as a
//! short pseudo event stream.
mod adapter;
mod auth;
mod errors;
mod handler;
pub mod helper;
mod router;
pub mod types;

pub use errors::{CCProxyError, ProxyResult};
pub use handler::{handle_chat_completion, ProxyChatRequest};
pub use router::{routes, SharedState, CHAT_ROUTES};
pub use types::openai;
