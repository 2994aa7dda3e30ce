//! Chat call-through for stock-vision
//!
//! This crate provides a small provider-agnostic layer over hosted Large
//! Language Model APIs, enough to back a question/answer chat widget:
//!
//! - Message types for LLM communication
//! - Completion request/response types
//! - Provider trait for LLM implementations
//! - A [`ChatSession`] that keeps conversation history
//! - Concrete providers (Gemini, OpenAI-compatible) behind feature flags

pub mod chat;
pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use chat::ChatSession;
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

// Provider implementations (feature-gated)
#[cfg(any(feature = "gemini", feature = "openai"))]
pub mod providers;
