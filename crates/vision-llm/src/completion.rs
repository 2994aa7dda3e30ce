//! Request and response types shared by every provider

use crate::{LLMError, Message, Result, Role};
use serde::{Deserialize, Serialize};

/// Reply length used when the caller does not choose one
pub const DEFAULT_MAX_TOKENS: usize = 1024;

/// One round trip to a chat model
///
/// `messages` holds the whole conversation, oldest first, and must end with
/// the user's turn. The system prompt travels separately because providers
/// place it differently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            system: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
        }
    }

    /// Single-question request
    pub fn ask(model: impl Into<String>, question: impl Into<String>) -> Self {
        Self::new(model, vec![Message::user(question)])
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Reject requests no provider would accept, before any network call
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(LLMError::InvalidRequest("model name is empty".to_string()));
        }
        if self.max_tokens == 0 {
            return Err(LLMError::InvalidRequest("max_tokens must be positive".to_string()));
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(LLMError::InvalidRequest(format!(
                    "temperature {t} is outside 0.0..=2.0"
                )));
            }
        }
        match self.messages.last() {
            None => Err(LLMError::InvalidRequest("no messages".to_string())),
            Some(last) if last.role != Role::User => Err(LLMError::InvalidRequest(
                "conversation must end with a user message".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }
}

/// A model reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub message: Message,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

impl CompletionResponse {
    pub fn text(&self) -> &str {
        self.message.text()
    }

    /// The reply was cut short by the token limit or a safety filter
    pub fn is_truncated(&self) -> bool {
        matches!(
            self.stop_reason,
            StopReason::MaxTokens | StopReason::ContentFilter
        )
    }
}

/// Why generation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
    /// Output withheld by the provider's safety filter
    ContentFilter,
}

/// Token accounting reported by the provider; zero when not reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl TokenUsage {
    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}
