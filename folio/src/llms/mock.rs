//! Scripted chat provider for tests and offline runs.
//!
//! [`MockChatProvider`] replays a queue of prepared responses and records
//! every request it receives, so tests can assert on what an agent sent.
//!
//! ```rust,ignore
//! let mock = Arc::new(
//!     MockChatProvider::new()
//!         .push_tool_call("load_artifacts", json!({}))
//!         .push_text("Attention Is All You Need"),
//! );
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::chat::{ChatProvider, ChatRequest, ChatResponse};
use crate::error::{LlmError, Result};
use crate::message::ToolCall;

/// A chat provider that answers from a script.
#[derive(Debug, Default)]
pub struct MockChatProvider {
    model: String,
    inline_data: bool,
    script: Mutex<VecDeque<std::result::Result<ChatResponse, LlmError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockChatProvider {
    /// Creates a provider with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self {
            model: "mock-model".to_owned(),
            inline_data: true,
            ..Self::default()
        }
    }

    /// Set the model reported as default.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set whether the provider claims to accept inline data.
    #[must_use]
    pub const fn with_inline_data(mut self, supported: bool) -> Self {
        self.inline_data = supported;
        self
    }

    /// Queue a full response.
    #[must_use]
    pub fn push_response(self, response: ChatResponse) -> Self {
        lock(&self.script).push_back(Ok(response));
        self
    }

    /// Queue a text response.
    #[must_use]
    pub fn push_text(self, text: impl Into<String>) -> Self {
        self.push_response(ChatResponse::from_text(text))
    }

    /// Queue a response requesting a single tool call.
    ///
    /// Call ids are `call_{n}` where `n` counts queued tool calls.
    #[must_use]
    pub fn push_tool_call(self, name: impl Into<String>, arguments: Value) -> Self {
        let id = format!("call_{}", self.queued());
        self.push_response(ChatResponse::from_tool_calls(vec![ToolCall::new(
            id, name, arguments,
        )]))
    }

    /// Queue a response requesting several tool calls at once.
    #[must_use]
    pub fn push_tool_calls(self, calls: Vec<ToolCall>) -> Self {
        self.push_response(ChatResponse::from_tool_calls(calls))
    }

    /// Queue an error.
    #[must_use]
    pub fn push_error(self, error: LlmError) -> Self {
        lock(&self.script).push_back(Err(error));
        self
    }

    /// Number of scripted entries not yet consumed.
    #[must_use]
    pub fn queued(&self) -> usize {
        lock(&self.script).len()
    }

    /// Requests received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<ChatRequest> {
        lock(&self.requests).clone()
    }

    /// The most recent request, if any.
    #[must_use]
    pub fn last_request(&self) -> Option<ChatRequest> {
        lock(&self.requests).last().cloned()
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        lock(&self.requests).push(request.clone());
        let next = lock(&self.script).pop_front();
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(e)) => Err(e.into()),
            None => Err(LlmError::internal("mock script exhausted").into()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    fn supports_inline_data(&self) -> bool {
        self.inline_data
    }
}
