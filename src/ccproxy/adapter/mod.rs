mod openai_output;

pub use openai_output::OpenAIOutputAdapter;
