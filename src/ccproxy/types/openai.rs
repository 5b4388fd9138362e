use serde::{Deserialize, Serialize};

/// Message shape used both for a non-stream `message` and a stream `delta`.
///
/// An empty delta serializes as `{}`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UnifiedChatMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>, // "assistant"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OpenAIChatCompletionResponse {
    pub id: String,     // chat completion id
    pub object: String, // "chat.completion"
    pub created: u64,   // unix timestamp
    pub model: String,  // echoed from the request
    pub choices: Vec<OpenAIChatCompletionChoice>,
    pub usage: OpenAIUsage,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OpenAIChatCompletionChoice {
    pub index: u32,
    pub message: UnifiedChatMessage,
    pub finish_reason: Option<String>, // always "stop" here
}

/// Length-based usage, not real token counts.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OpenAIUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

// For streaming
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OpenAIChatCompletionStreamResponse {
    pub id: String,
    pub object: String, // "chat.completion.chunk"
    pub created: u64,
    pub model: String,
    pub choices: Vec<OpenAIStreamChoice>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OpenAIStreamChoice {
    pub index: u32,
    pub delta: UnifiedChatMessage,
    /// Serialized as `null` on the opening chunk.
    pub finish_reason: Option<String>,
}
