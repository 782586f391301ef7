//! OpenAI-compatible chat-completions adapter.

pub mod client;
pub mod errors;

pub use client::ChatCompletionsClient;
pub use errors::LlmApiError;
