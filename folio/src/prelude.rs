//! Prelude module for convenient imports.
//!
//! This module re-exports commonly used types and traits for easy access.
//!
//! # Usage
//!
//! ```rust,ignore
//! use folio::prelude::*;
//! ```

pub use crate::agent::{
    Agent, NextStep, RunConfig, RunResult, Runner, StepInfo, ToolCallRecord, UserInput,
};
pub use crate::app::{App, AppSession};
pub use crate::artifact::{
    Artifact, ArtifactScope, ArtifactService, InMemoryArtifactService, SharedArtifactService,
};
pub use crate::chat::{
    ChatProvider, ChatRequest, ChatResponse, SharedChatProvider, StopReason, ToolChoice,
};
pub use crate::context::ToolContext;
pub use crate::error::{ArtifactError, Error, LlmError, LlmErrorKind, Result, ToolError};
pub use crate::llms::{Gemini, GeminiConfig, MockChatProvider, VertexTarget};
pub use crate::memory::{InMemorySession, Session, SharedSession};
pub use crate::message::{Blob, Content, ContentPart, Message, Role, ToolCall};
pub use crate::plugin::{BoxedPlugin, Plugin, SaveFilesAsArtifactsPlugin};
pub use crate::title::{TitleOptions, root_agent, title_app, title_extractor_agent};
pub use crate::tool::{BoxedTool, DynTool, Tool, ToolCallResult, ToolDefinition, ToolResult};
pub use crate::tools::{ExtractTitleTool, LoadArtifactsTool, extract_title};
pub use crate::usage::Usage;
