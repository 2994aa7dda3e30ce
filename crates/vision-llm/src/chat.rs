//! Conversation state for the chat widget

use crate::completion::DEFAULT_MAX_TOKENS;
use crate::{CompletionRequest, LLMProvider, Message, Result};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Default system prompt for the stock assistant
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Vision, a concise assistant for a stock \
     market dashboard. Answer questions about stocks, technical indicators and market \
     concepts. Do not give personalised investment advice.";

/// A running conversation with a provider
///
/// Each call to [`ChatSession::ask`] sends the full history. A failed turn
/// leaves the history untouched.
pub struct ChatSession {
    provider: Arc<dyn LLMProvider>,
    model: String,
    system: Option<String>,
    max_tokens: usize,
    history: Vec<Message>,
}

impl ChatSession {
    /// Create a new session for `model` using the default system prompt
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            system: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
            max_tokens: DEFAULT_MAX_TOKENS,
            history: Vec::new(),
        }
    }

    /// Replace the system prompt (`None` sends no system prompt)
    pub fn with_system(mut self, system: Option<String>) -> Self {
        self.system = system;
        self
    }

    /// Set the response token limit
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Send a user message and return the assistant's reply
    #[instrument(skip(self, text), fields(provider = self.provider.name(), model = %self.model))]
    pub async fn ask(&mut self, text: impl Into<String>) -> Result<String> {
        let mut messages = self.history.clone();
        messages.push(Message::user(text));

        let mut request =
            CompletionRequest::new(&self.model, messages.clone()).with_max_tokens(self.max_tokens);
        if let Some(system) = &self.system {
            request = request.with_system(system);
        }

        let response = self.provider.complete(request).await?;
        debug!(
            "Chat turn complete - stop_reason: {:?}, tokens: {}",
            response.stop_reason,
            response.usage.total()
        );

        let reply = response.message.content.clone();
        messages.push(response.message);
        self.history = messages;

        Ok(reply)
    }

    /// Conversation so far
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Forget the conversation
    pub fn clear(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockLLMProvider;
    use crate::{CompletionResponse, LLMError, Role, StopReason, TokenUsage};

    fn reply(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 5,
            },
        }
    }

    #[tokio::test]
    async fn test_ask_accumulates_history() {
        let mut provider = MockLLMProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_complete()
            .withf(|req| req.messages.len() == 1 && req.system.is_some())
            .times(1)
            .returning(|_| Ok(reply("RSI measures momentum.")));
        provider
            .expect_complete()
            .withf(|req| req.messages.len() == 3)
            .times(1)
            .returning(|_| Ok(reply("Above 70 is overbought.")));

        let mut session = ChatSession::new(Arc::new(provider), "gemini-2.0-flash");

        let first = session.ask("What is RSI?").await.unwrap();
        assert_eq!(first, "RSI measures momentum.");

        let second = session.ask("When is it high?").await.unwrap();
        assert_eq!(second, "Above 70 is overbought.");

        let history = session.history();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[3].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_failed_turn_keeps_history() {
        let mut provider = MockLLMProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_complete()
            .returning(|_| Err(LLMError::AuthenticationFailed));

        let mut session = ChatSession::new(Arc::new(provider), "gemini-2.0-flash");
        assert!(session.ask("hello").await.is_err());
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_without_system_prompt() {
        let mut provider = MockLLMProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_complete()
            .withf(|req| req.system.is_none() && req.max_tokens == 256)
            .returning(|_| Ok(reply("ok")));

        let mut session = ChatSession::new(Arc::new(provider), "m")
            .with_system(None)
            .with_max_tokens(256);
        assert_eq!(session.ask("hi").await.unwrap(), "ok");

        session.clear();
        assert!(session.history().is_empty());
    }
}
