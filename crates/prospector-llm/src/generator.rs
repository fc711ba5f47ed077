//! The `TextGenerator` seam and its streaming-LLM implementation.

use async_trait::async_trait;
use prospector_core::Result;
use reqwest::Client;
use tracing::info;

use crate::config::{LLMConfig, ResolvedProvider};
use crate::providers::{collect_stream, stream_llm};
use crate::types::{ChatMessage, Completion, GenerationParams, LLMProvider};

const SYSTEM_PROMPT: &str =
    "You write web search queries for finding business contact details. Reply with a JSON array of strings only.";

/// Anything that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<Completion>;

    /// Model identifier reported in responses.
    fn model(&self) -> &str;
}

/// Text generator backed by one of the hosted LLM APIs.
pub struct LlmTextGenerator {
    client: Client,
    provider: LLMProvider,
    model: String,
    api_key: String,
}

impl LlmTextGenerator {
    pub fn new(resolved: ResolvedProvider) -> Self {
        Self {
            client: Client::new(),
            provider: resolved.provider,
            model: resolved.model,
            api_key: resolved.api_key,
        }
    }

    /// Build a generator for the configured provider, if any.
    pub fn from_config(config: &LLMConfig) -> Option<Self> {
        let resolved = config.resolve_provider()?;
        info!("Using {} model {}", resolved.provider, resolved.model);
        Some(Self::new(resolved))
    }

    pub fn provider(&self) -> LLMProvider {
        self.provider
    }
}

#[async_trait]
impl TextGenerator for LlmTextGenerator {
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<Completion> {
        let messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];
        let stream = stream_llm(
            &self.client,
            self.provider,
            messages,
            &self.model,
            &self.api_key,
            *params,
        );
        let (text, tokens_used) = collect_stream(stream).await?;
        Ok(Completion {
            text,
            model: self.model.clone(),
            tokens_used,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_without_keys() {
        assert!(LlmTextGenerator::from_config(&LLMConfig::default()).is_none());
    }

    #[test]
    fn test_from_config_picks_resolved_model() {
        let config = LLMConfig {
            groq_api_key: Some("gsk".into()),
            ..LLMConfig::default()
        };
        let generator = LlmTextGenerator::from_config(&config).unwrap();
        assert_eq!(generator.provider(), LLMProvider::Groq);
        assert_eq!(generator.model(), crate::config::DEFAULT_GROQ_MODEL);
    }
}
