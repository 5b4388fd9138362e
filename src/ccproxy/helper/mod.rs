mod common;
pub mod sse;
pub mod stream_handler;
mod upstream;

pub use common::*;
pub use sse::Event;
pub use upstream::{extract_content, UpstreamClient};
