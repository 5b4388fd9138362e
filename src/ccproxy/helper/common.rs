/// Generates a chat completion id in the OpenAI `chatcmpl-` form.
pub fn get_msg_id() -> String {
    format!("chatcmpl-{}", uuid::Uuid::new_v4())
}

/// Current unix timestamp in seconds.
pub fn unix_timestamp() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// String length in UTF-16 code units, the unit browser clients count in.
pub fn text_length(text: &str) -> u64 {
    text.encode_utf16().count() as u64
}
