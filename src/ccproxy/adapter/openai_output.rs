use crate::ccproxy::errors::{CCProxyError, ProxyResult};
use crate::ccproxy::helper::{get_msg_id, text_length, unix_timestamp, Event};
use crate::ccproxy::types::openai::{
    OpenAIChatCompletionChoice, OpenAIChatCompletionResponse, OpenAIChatCompletionStreamResponse,
    OpenAIStreamChoice, OpenAIUsage, UnifiedChatMessage,
};
use crate::ccproxy::types::{
    FINISH_REASON_STOP, OBJECT_CHAT_COMPLETION, OBJECT_CHAT_COMPLETION_CHUNK, ROLE_ASSISTANT,
    SSE_DONE,
};

/// Reshapes an upstream reply into OpenAI chat completion payloads.
///
/// One adapter serves one request: every payload it produces shares the same
/// completion id and `created` timestamp and echoes the requested model.
pub struct OpenAIOutputAdapter {
    message_id: String,
    created: u64,
    model: String,
}

impl OpenAIOutputAdapter {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            message_id: get_msg_id(),
            created: unix_timestamp(),
            model: model.into(),
        }
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    /// Builds the non-stream `chat.completion` object.
    ///
    /// `prompt` is the serialized request body; usage counts are string
    /// lengths of the prompt and the content.
    pub fn adapt_response(&self, content: String, prompt: &str) -> OpenAIChatCompletionResponse {
        let prompt_tokens = text_length(prompt);
        let completion_tokens = text_length(&content);

        OpenAIChatCompletionResponse {
            id: self.message_id.clone(),
            object: OBJECT_CHAT_COMPLETION.to_string(),
            created: self.created,
            model: self.model.clone(),
            choices: vec![OpenAIChatCompletionChoice {
                index: 0,
                message: UnifiedChatMessage {
                    role: Some(ROLE_ASSISTANT.to_string()),
                    content: Some(content),
                },
                finish_reason: Some(FINISH_REASON_STOP.to_string()),
            }],
            usage: OpenAIUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
        }
    }

    /// The empty-delta chunk sent as soon as the stream opens.
    pub fn opening_chunk(&self) -> OpenAIChatCompletionStreamResponse {
        self.chunk(UnifiedChatMessage::default(), None)
    }

    /// The single chunk carrying the whole reply.
    pub fn content_chunk(&self, content: String) -> OpenAIChatCompletionStreamResponse {
        self.chunk(
            UnifiedChatMessage {
                role: None,
                content: Some(content),
            },
            Some(FINISH_REASON_STOP.to_string()),
        )
    }

    /// Content chunk followed by the `[DONE]` terminator.
    pub fn closing_events(&self, content: String) -> ProxyResult<Vec<Event>> {
        Ok(vec![
            chunk_event(&self.content_chunk(content))?,
            Event::data(SSE_DONE),
        ])
    }

    pub fn opening_event(&self) -> ProxyResult<Event> {
        chunk_event(&self.opening_chunk())
    }

    fn chunk(
        &self,
        delta: UnifiedChatMessage,
        finish_reason: Option<String>,
    ) -> OpenAIChatCompletionStreamResponse {
        OpenAIChatCompletionStreamResponse {
            id: self.message_id.clone(),
            object: OBJECT_CHAT_COMPLETION_CHUNK.to_string(),
            created: self.created,
            model: self.model.clone(),
            choices: vec![OpenAIStreamChoice {
                index: 0,
                delta,
                finish_reason,
            }],
        }
    }
}

fn chunk_event(chunk: &OpenAIChatCompletionStreamResponse) -> ProxyResult<Event> {
    Event::json(chunk).map_err(|e| {
        CCProxyError::ResponseBuild(format!("Failed to serialize stream chunk {}: {}", &chunk.id, e))
    })
}
