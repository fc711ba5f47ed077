//! External LLM access (OpenAI/Anthropic/Groq) for query generation.
//!
//! Completions are streamed over SSE and collected into a single string.
//! LLM calls go to external APIs, no local model required.

pub mod config;
pub mod generator;
pub mod providers;
pub mod types;

pub use config::{LLMConfig, ResolvedProvider};
pub use generator::{LlmTextGenerator, TextGenerator};
pub use types::*;
