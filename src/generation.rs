//! Text generation adapter.
//!
//! The QA engine hands a fully composed prompt to a [`Generator`] and gets back
//! whatever text the model produced. An empty reply is returned as-is; the engine
//! decides what to do with it.

use crate::error::{Result, TubechatError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Trait for answer generation.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce a completion for the prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Chat-completion generator backed by the OpenAI API.
pub struct OpenAIGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIGenerator {
    pub fn new(model: &str) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: model.to_string(),
            temperature: 0.2,
            max_tokens: 512,
        })
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_chars = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        // The prompt already carries the grounding rules, so it goes out as one user message.
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| TubechatError::Provider(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_completion_tokens(self.max_tokens)
            .build()
            .map_err(|e| TubechatError::Provider(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            TubechatError::Provider(format!("Failed to generate response: {}", e))
        })?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        debug!("Generated {} chars", answer.len());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_creation() {
        let generator = OpenAIGenerator::new("gpt-4o-mini")
            .unwrap()
            .with_temperature(0.0)
            .with_max_tokens(64);
        assert_eq!(generator.model, "gpt-4o-mini");
        assert_eq!(generator.temperature, 0.0);
        assert_eq!(generator.max_tokens, 64);
    }
}
