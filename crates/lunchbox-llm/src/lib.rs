//! Lunchbox LLM Provider Layer
//!
//! Pluggable chat providers behind the [`ChatProvider`] trait.
//!
//! # Architecture
//!
//! A provider answers one chat turn at a time: it receives the whole
//! conversation plus the tools on offer and returns either text, tool call
//! requests, or both. Driving multi-turn exchanges is left to callers.
//!
//! # Providers
//!
//! - `MockProvider`: Scripted replies for testing
//! - `OpenAiProvider`: OpenAI-compatible chat-completions API
//!
//! # Examples
//!
//! ```
//! use lunchbox_llm::{ChatProvider, ChatRequest, Message, MockProvider};
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let reply = provider.complete(&ChatRequest::new(vec![Message::user("hi")])).unwrap();
//! assert_eq!(reply.content.as_deref(), Some("Hello from LLM!"));
//! ```

#![warn(missing_docs)]

pub mod openai;
pub mod types;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use openai::{OpenAiConfig, OpenAiProvider};
pub use types::{ChatReply, ChatRequest, Message, Role, ToolCall, ToolChoice, ToolDefinition};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// A chat-completion backend
pub trait ChatProvider {
    /// Error type for provider operations
    type Error;

    /// Submit one turn and return the model's reply
    fn complete(&self, request: &ChatRequest) -> Result<ChatReply, Self::Error>;
}

/// Mock chat provider for deterministic testing
///
/// Replies are served from a script in order; once the script runs out,
/// every turn gets the default text reply. All requests are recorded.
///
/// # Examples
///
/// ```
/// use lunchbox_llm::{ChatProvider, ChatReply, ChatRequest, Message, MockProvider, ToolCall};
///
/// let provider = MockProvider::new("{}");
/// provider.push_reply(ChatReply::tool_calls(vec![ToolCall::new("c1", "normalize_prices", "{}")]));
///
/// let request = ChatRequest::new(vec![Message::user("hi")]);
/// assert!(provider.complete(&request).unwrap().wants_tools());
/// assert_eq!(provider.complete(&request).unwrap().content.as_deref(), Some("{}"));
/// assert_eq!(provider.call_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    script: Arc<Mutex<VecDeque<Result<ChatReply, String>>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed text reply for every turn
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a reply for the next unscripted turn
    pub fn push_reply(&self, reply: ChatReply) {
        self.script.lock().unwrap().push_back(Ok(reply));
    }

    /// Queue a text reply for the next unscripted turn
    pub fn push_text(&self, content: impl Into<String>) {
        self.push_reply(ChatReply::text(content));
    }

    /// Queue a failure for the next unscripted turn
    pub fn push_error(&self, message: impl Into<String>) {
        self.script.lock().unwrap().push_back(Err(message.into()));
    }

    /// Get the number of turns submitted
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Forget recorded requests
    pub fn reset_call_count(&self) {
        self.requests.lock().unwrap().clear();
    }

    /// Every request submitted so far, oldest first
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl ChatProvider for MockProvider {
    type Error = LlmError;

    fn complete(&self, request: &ChatRequest) -> Result<ChatReply, Self::Error> {
        self.requests.lock().unwrap().push(request.clone());

        match self.script.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(LlmError::Other(message)),
            None => Ok(ChatReply::text(self.default_response.clone())),
        }
    }
}
