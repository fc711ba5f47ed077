//! External LLM provider streaming implementations.
//!
//! Each provider streams tokens via SSE from their respective APIs.
//! OpenAI and Groq use the same format. Anthropic uses a different one.

use std::pin::Pin;

use futures::Stream;
use prospector_core::{Error, Result};
use reqwest::Client;
use serde_json::json;
use tokio_stream::StreamExt;
use tracing::{debug, error};

use crate::types::{ChatMessage, GenerationParams, LLMProvider};

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Boxed stream type for returning different stream implementations.
pub type BoxedStream = Pin<Box<dyn Stream<Item = StreamChunk> + Send>>;

/// A single streamed token or error.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    Token(String),
    Done { tokens_used: usize },
    Error(String),
}

/// Which SSE payload shape to expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    OpenAICompat,
    Anthropic,
}

/// Accumulates raw bytes and hands back complete SSE `data:` payloads.
#[derive(Default)]
pub struct SseLineBuffer {
    /// Raw bytes of the unfinished line; a UTF-8 sequence may straddle chunks.
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes and drain every complete `data:` line.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(line_end) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=line_end).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim();

            // Comments and `event:` lines carry nothing we need
            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            if let Some(data) = line.strip_prefix("data:") {
                payloads.push(data.trim_start().to_string());
            }
        }
        payloads
    }
}

/// Interpret one OpenAI-compatible `data:` payload.
pub fn parse_openai_event(data: &str) -> Option<StreamChunk> {
    if data.trim() == "[DONE]" {
        return Some(StreamChunk::Done { tokens_used: 0 });
    }
    let parsed: serde_json::Value = serde_json::from_str(data).ok()?;
    if let Some(message) = parsed["error"]["message"].as_str() {
        return Some(StreamChunk::Error(message.to_string()));
    }
    parsed["choices"][0]["delta"]["content"]
        .as_str()
        .filter(|c| !c.is_empty())
        .map(|c| StreamChunk::Token(c.to_string()))
}

/// Interpret one Anthropic Messages API `data:` payload.
pub fn parse_anthropic_event(data: &str) -> Option<StreamChunk> {
    let parsed: serde_json::Value = serde_json::from_str(data).ok()?;
    match parsed["type"].as_str() {
        Some("content_block_delta") => parsed["delta"]["text"]
            .as_str()
            .filter(|t| !t.is_empty())
            .map(|t| StreamChunk::Token(t.to_string())),
        Some("message_stop") => Some(StreamChunk::Done { tokens_used: 0 }),
        Some("error") => {
            let msg = parsed["error"]["message"]
                .as_str()
                .unwrap_or("Unknown error");
            error!("Anthropic error: {}", msg);
            Some(StreamChunk::Error(msg.to_string()))
        }
        _ => None,
    }
}

/// Stream tokens from the appropriate provider.
pub fn stream_llm(
    client: &Client,
    provider: LLMProvider,
    messages: Vec<ChatMessage>,
    model: &str,
    api_key: &str,
    params: GenerationParams,
) -> BoxedStream {
    let model = model.to_string();
    match provider {
        LLMProvider::OpenAI | LLMProvider::Groq => {
            let url = if provider == LLMProvider::OpenAI {
                OPENAI_URL
            } else {
                GROQ_URL
            };
            let msgs: Vec<serde_json::Value> = messages
                .iter()
                .map(|m| json!({"role": m.role, "content": m.content}))
                .collect();
            let body = json!({
                "model": model,
                "messages": msgs,
                "temperature": params.temperature,
                "max_tokens": params.max_tokens,
                "stream": true,
            });
            let request = client
                .post(url)
                .header("Authorization", format!("Bearer {}", api_key))
                .header("Content-Type", "application/json")
                .json(&body);
            debug!("Streaming from {} with model {}", provider, model);
            Box::pin(stream_sse(request, Dialect::OpenAICompat))
        }
        LLMProvider::Anthropic => {
            // Separate system message from conversation
            let system_msg: Option<String> = messages
                .iter()
                .find(|m| m.role == "system")
                .map(|m| m.content.clone());
            let conv_msgs: Vec<serde_json::Value> = messages
                .iter()
                .filter(|m| m.role != "system")
                .map(|m| json!({"role": m.role, "content": m.content}))
                .collect();

            let mut body = json!({
                "model": model,
                "messages": conv_msgs,
                "temperature": params.temperature,
                "max_tokens": params.max_tokens,
                "stream": true,
            });
            if let Some(sys) = system_msg {
                body["system"] = json!(sys);
            }

            let request = client
                .post(ANTHROPIC_URL)
                .header("x-api-key", api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("Content-Type", "application/json")
                .json(&body);
            debug!("Streaming from Anthropic with model {}", model);
            Box::pin(stream_sse(request, Dialect::Anthropic))
        }
    }
}

fn stream_sse(
    request: reqwest::RequestBuilder,
    dialect: Dialect,
) -> impl Stream<Item = StreamChunk> + Send + 'static {
    async_stream::stream! {
        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                yield StreamChunk::Error(format!("Request failed: {}", e));
                return;
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            yield StreamChunk::Error(format!("API error {}: {}", status, body));
            return;
        }

        let mut stream = response.bytes_stream();
        let mut lines = SseLineBuffer::new();
        let mut token_count = 0usize;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    yield StreamChunk::Error(format!("Stream read error: {}", e));
                    return;
                }
            };

            for data in lines.push(&bytes) {
                let event = match dialect {
                    Dialect::OpenAICompat => parse_openai_event(&data),
                    Dialect::Anthropic => parse_anthropic_event(&data),
                };
                match event {
                    Some(StreamChunk::Token(text)) => {
                        token_count += 1;
                        yield StreamChunk::Token(text);
                    }
                    Some(StreamChunk::Done { .. }) => {
                        yield StreamChunk::Done { tokens_used: token_count };
                        return;
                    }
                    Some(StreamChunk::Error(e)) => {
                        yield StreamChunk::Error(e);
                        return;
                    }
                    None => {}
                }
            }
        }

        yield StreamChunk::Done { tokens_used: token_count };
    }
}

/// Drain a token stream into the full text and its chunk count.
pub async fn collect_stream(mut stream: BoxedStream) -> Result<(String, usize)> {
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        match chunk {
            StreamChunk::Token(t) => text.push_str(&t),
            StreamChunk::Done { tokens_used } => return Ok((text, tokens_used)),
            StreamChunk::Error(e) => return Err(Error::ProviderUnavailable(e)),
        }
    }
    Err(Error::ProviderUnavailable(
        "stream ended without completion".into(),
    ))
}
