pub const OBJECT_CHAT_COMPLETION: &str = "chat.completion";
pub const OBJECT_CHAT_COMPLETION_CHUNK: &str = "chat.completion.chunk";

pub const ROLE_ASSISTANT: &str = "assistant";
pub const FINISH_REASON_STOP: &str = "stop";

/// Literal payload of the final SSE event.
pub const SSE_DONE: &str = "[DONE]";
