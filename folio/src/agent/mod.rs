//! Agent module: core abstractions for building agents.
//!
//! - **[`Agent`]** is a self-contained unit with its own LLM provider, so the
//!   orchestrator and its sub-agents may use different models.
//! - **[`Runner`]** is a stateless execution engine that drives the agent through
//!   a ReAct-style loop (think, act, observe, repeat).
//! - **Managed agents** are sub-agents registered via [`Agent::managed_agent`].
//!   The parent's model calls them like tools with a single `task` argument.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use folio::agent::{Agent, RunConfig};
//!
//! let agent = Agent::new("assistant")
//!     .instructions("You are a helpful assistant.")
//!     .model("gemini-2.5-flash")
//!     .provider(gemini.clone());
//!
//! let result = agent.run("Hello!", RunConfig::default()).await?;
//! println!("{}", result.output);
//! ```

mod config;
pub mod result;
mod runner;

pub use config::Agent;
pub use result::{NextStep, RunConfig, RunResult, StepInfo, ToolCallRecord, UserInput};
pub use runner::Runner;
