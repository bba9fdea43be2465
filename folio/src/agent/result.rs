//! Run configuration, input and result types.

use std::fmt;

use serde_json::Value;

use crate::chat::ChatResponse;
use crate::context::ToolContext;
use crate::memory::SharedSession;
use crate::message::{ContentPart, Message, ToolCall};
use crate::usage::Usage;

/// User input to an agent run.
#[derive(Debug, Clone)]
pub enum UserInput {
    /// Plain text.
    Text(String),
    /// Multi-part content (text and uploaded files).
    Parts(Vec<ContentPart>),
    /// A fully formed user message.
    Message(Message),
}

impl UserInput {
    /// Convert the input into the user message sent to the model.
    #[must_use]
    pub fn into_message(self) -> Message {
        match self {
            Self::Text(text) => Message::user(text),
            Self::Parts(parts) => Message::user_parts(parts),
            Self::Message(message) => message,
        }
    }
}

impl From<&str> for UserInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for UserInput {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<ContentPart>> for UserInput {
    fn from(parts: Vec<ContentPart>) -> Self {
        Self::Parts(parts)
    }
}

impl From<Message> for UserInput {
    fn from(message: Message) -> Self {
        Self::Message(message)
    }
}

/// Run-level configuration.
#[derive(Clone, Default)]
pub struct RunConfig {
    /// Overrides the agent's own step limit.
    pub max_steps: Option<usize>,
    /// Conversation history loaded before and saved after the run.
    pub session: Option<SharedSession>,
    /// Invocation context passed to tools and managed agents.
    /// A detached context is created when unset.
    pub context: Option<ToolContext>,
    /// Maximum number of tool calls executed at once. `None` runs every call
    /// of a step together.
    pub max_tool_concurrency: Option<usize>,
}

impl RunConfig {
    /// Creates a default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the step limit.
    #[must_use]
    pub const fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Attach a session.
    #[must_use]
    pub fn session(mut self, session: SharedSession) -> Self {
        self.session = Some(session);
        self
    }

    /// Attach an invocation context.
    #[must_use]
    pub fn context(mut self, context: ToolContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Bound tool call concurrency.
    #[must_use]
    pub const fn max_tool_concurrency(mut self, limit: usize) -> Self {
        self.max_tool_concurrency = Some(limit);
        self
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("max_steps", &self.max_steps)
            .field("session", &self.session.as_ref().map(|s| s.id().to_owned()))
            .field("context", &self.context)
            .field("max_tool_concurrency", &self.max_tool_concurrency)
            .finish()
    }
}

/// What the runner does after a model response.
#[derive(Debug, Clone)]
pub enum NextStep {
    /// The model answered; the run is complete.
    FinalOutput {
        /// The answer text.
        output: String,
    },
    /// The model requested tool calls.
    ToolCalls {
        /// Calls in the order the model issued them.
        calls: Vec<ToolCall>,
    },
}

/// Record of one executed tool call.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Call identifier.
    pub id: String,
    /// Tool or managed agent name.
    pub name: String,
    /// Arguments the model supplied.
    pub arguments: Value,
    /// Observation returned to the model.
    pub result: String,
    /// Whether the call succeeded.
    pub success: bool,
}

/// One reasoning step.
#[derive(Debug, Clone)]
pub struct StepInfo {
    /// Step number, starting at 1.
    pub step: usize,
    /// The model response for this step.
    pub response: ChatResponse,
    /// Tool calls executed in this step.
    pub tool_calls: Vec<ToolCallRecord>,
}

/// Result of a completed agent run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Final answer text. Empty when the model answered with no text.
    pub output: String,
    /// Token usage accumulated over every step.
    pub usage: Usage,
    /// Number of steps taken.
    pub steps: usize,
    /// Per-step history.
    pub step_history: Vec<StepInfo>,
    /// Name of the agent that produced the result.
    pub agent_name: String,
}

impl RunResult {
    /// Iterate over every tool call made during the run.
    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCallRecord> {
        self.step_history.iter().flat_map(|s| s.tool_calls.iter())
    }
}
