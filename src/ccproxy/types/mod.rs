mod constants;
pub mod openai;

pub use constants::*;
