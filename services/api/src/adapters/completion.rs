//! services/api/src/adapters/completion.rs
//!
//! This module contains the adapter for the quiz-generating LLM.
//! It implements the `TextCompletionService` port from the `core` crate
//! against any OpenAI-compatible chat endpoint; locally that is Ollama
//! serving `llama3.2`.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;
use quizbot_core::ports::{PortError, PortResult, TextCompletionService};
use tracing::debug;

/// An adapter that implements `TextCompletionService` using an
/// OpenAI-compatible LLM endpoint.
#[derive(Clone)]
pub struct OpenAiCompletionAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCompletionAdapter {
    /// Creates a new `OpenAiCompletionAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl TextCompletionService for OpenAiCompletionAdapter {
    /// Sends one flat prompt as a single user message and returns the raw
    /// response text. The prompt templates carry all the instructions, so
    /// no system message is used.
    async fn complete(&self, prompt: &str) -> PortResult<String> {
        debug!(model = %self.model, prompt_chars = prompt.len(), "Sending completion request");

        let messages = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unavailable(e.to_string()))?;

        // Extract the text content from the first choice in the response.
        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                Ok(content)
            } else {
                Err(PortError::Unexpected(
                    "Completion response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(PortError::Unexpected(
                "Completion service returned no choices in its response.".to_string(),
            ))
        }
    }
}
