mod chat_handler;

pub use chat_handler::{handle_chat_completion, ProxyChatRequest};
