//! Agent configuration types.
//!
//! The [`Agent`] struct defines an agent's identity, behavior, capabilities,
//! and its own LLM provider. Each agent is self-contained and can be run
//! independently via [`Agent::run`], or nested under another agent as a
//! managed agent.
//!
//! # Example
//!
//! ```rust,ignore
//! use folio::agent::Agent;
//!
//! let agent = Agent::new("title_extractor")
//!     .instructions("Return only the extracted title.")
//!     .model("gemini-2.5-flash")
//!     .provider(gemini.clone())
//!     .tool(Box::new(ExtractTitleTool::new(gemini.clone())));
//!
//! let result = agent.run("What is the title?", Default::default()).await?;
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::chat::SharedChatProvider;
use crate::error::Result;
use crate::tool::{BoxedTool, ToolDefinition};

use super::result::{RunConfig, RunResult, UserInput};

/// A pure configuration struct defining an AI agent.
///
/// `Agent` contains no execution logic. It describes *what* the agent is and
/// *what* it can do. The [`Runner`](super::Runner) handles *how* it runs.
pub struct Agent {
    /// Unique name identifying this agent.
    pub(crate) name: String,

    /// System-level instructions (prompt) for the agent.
    pub(crate) instructions: String,

    /// LLM model identifier. Empty means the provider's default.
    pub(crate) model: String,

    /// The LLM provider this agent uses for chat completions.
    pub(crate) provider: Option<SharedChatProvider>,

    /// Tools available to this agent for function calling.
    pub(crate) tools: Vec<BoxedTool>,

    /// Sub-agents that can be dispatched as tools.
    pub(crate) managed_agents: Vec<Self>,

    /// Maximum number of reasoning steps before the runner aborts.
    pub(crate) max_steps: usize,

    /// Human-readable description of what this agent does.
    ///
    /// When this agent is used as a managed agent, the description becomes the
    /// tool description visible to the parent agent's LLM.
    pub(crate) description: String,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("provider", &self.provider.is_some())
            .field(
                "tools",
                &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .field(
                "managed_agents",
                &self
                    .managed_agents
                    .iter()
                    .map(|a| &a.name)
                    .collect::<Vec<_>>(),
            )
            .field("max_steps", &self.max_steps)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl Agent {
    /// Default maximum number of reasoning steps.
    pub const DEFAULT_MAX_STEPS: usize = 10;

    /// Create a new agent with the given name and sensible defaults.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            description: format!("Agent: {name}"),
            name,
            instructions: String::new(),
            model: String::new(),
            provider: None,
            tools: Vec::new(),
            managed_agents: Vec::new(),
            max_steps: Self::DEFAULT_MAX_STEPS,
        }
    }

    /// Set the system instructions.
    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Set the LLM model identifier.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the LLM provider for this agent.
    #[must_use]
    pub fn provider(mut self, provider: SharedChatProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Add a tool to this agent.
    #[must_use]
    pub fn tool(mut self, tool: BoxedTool) -> Self {
        self.tools.push(tool);
        self
    }

    /// Set all tools for this agent.
    #[must_use]
    pub fn tools(mut self, tools: Vec<BoxedTool>) -> Self {
        self.tools = tools;
        self
    }

    /// Add a managed (sub) agent.
    #[must_use]
    pub fn managed_agent(mut self, agent: Self) -> Self {
        self.managed_agents.push(agent);
        self
    }

    /// Set the maximum number of reasoning steps.
    #[must_use]
    pub const fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set the agent description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the agent's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the agent's model identifier.
    #[must_use]
    pub fn get_model(&self) -> &str {
        &self.model
    }

    /// Returns the agent's description.
    #[must_use]
    pub fn get_description(&self) -> &str {
        &self.description
    }

    /// Returns the agent's instructions.
    #[must_use]
    pub fn get_instructions(&self) -> &str {
        &self.instructions
    }

    /// Returns the maximum number of reasoning steps.
    #[must_use]
    pub const fn get_max_steps(&self) -> usize {
        self.max_steps
    }

    /// Returns `true` if a provider is configured.
    #[must_use]
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Names of the tools callable by this agent, managed agents included.
    #[must_use]
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools
            .iter()
            .map(|t| t.name())
            .chain(self.managed_agents.iter().map(|a| a.name.as_str()))
            .collect()
    }

    /// Run this agent to completion with the given input.
    ///
    /// Convenience wrapper around [`Runner::run`](super::Runner::run).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Agent`](crate::Error::Agent) if no provider is
    /// configured, or propagates errors from the run.
    pub fn run<'a>(
        &'a self,
        input: impl Into<UserInput>,
        config: RunConfig,
    ) -> Pin<Box<dyn Future<Output = Result<RunResult>> + Send + 'a>> {
        super::Runner::run(self, input, config)
    }

    /// Build a [`ToolDefinition`] for this agent when used as a managed sub-agent.
    ///
    /// The definition exposes a single `task` string parameter, which the parent
    /// agent's LLM fills in to describe the work to delegate.
    #[must_use]
    pub fn tool_definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            &self.name,
            &self.description,
            serde_json::json!({
                "type": "object",
                "properties": {
                    "task": {
                        "type": "string",
                        "description": "The task to delegate to this agent."
                    }
                },
                "required": ["task"]
            }),
        )
    }
}
