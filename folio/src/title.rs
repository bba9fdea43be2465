//! The title-extraction application.
//!
//! Two agents cooperate:
//!
//! - `root_agent` talks to the user, checks the upload with `load_artifacts`
//!   and delegates to the extractor;
//! - `title_extractor` calls `extract_title_with_gemini` and returns the
//!   title verbatim.
//!
//! [`title_app`] wraps them in an [`App`] named `agent_read_artifact` with a
//! [`SaveFilesAsArtifactsPlugin`], so files attached to a user message become
//! artifacts the extractor can read.

use std::sync::Arc;

use crate::agent::Agent;
use crate::app::App;
use crate::chat::SharedChatProvider;
use crate::plugin::SaveFilesAsArtifactsPlugin;
use crate::tools::{self, ExtractTitleTool, LoadArtifactsTool};

/// Name of the application and of its artifact scope.
pub const APP_NAME: &str = "agent_read_artifact";

/// Name of the root agent.
pub const ROOT_AGENT_NAME: &str = "root_agent";

/// Name of the extractor agent, and of the tool the root agent sees.
pub const TITLE_EXTRACTOR_NAME: &str = "title_extractor";

/// Model used by both agents by default.
pub const DEFAULT_AGENT_MODEL: &str = "gemini-2.5-flash";

/// Instructions of the extractor agent.
pub const TITLE_EXTRACTOR_INSTRUCTIONS: &str = "You are a Metadata Specialist.
1. Use 'extract_title_with_gemini' to read the file and extract the title.
2. Return ONLY the extracted title.";

/// Description of the extractor agent, shown to the root agent's model.
pub const TITLE_EXTRACTOR_DESCRIPTION: &str =
    "Reads the most recently uploaded file and returns its title.";

/// Instructions of the root agent.
pub const ROOT_INSTRUCTIONS: &str = "You will help with the uploading of a file and reading the title in the file.
Upon a user request
* ask the user to upload the file
* wait for load_artifacts to complete
* call title_extractor_agent with the tool context
* Respond to the user with the returned string from title_extractor_agent";

/// Description of the root agent.
pub const ROOT_DESCRIPTION: &str = "Orchestrator";

/// Models and limits for the title application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleOptions {
    /// Model of the root agent.
    pub root_model: String,
    /// Model of the extractor agent.
    pub extractor_model: String,
    /// Model the extraction tool sends the document to.
    pub extraction_model: String,
    /// Instruction sent with the document.
    pub extraction_prompt: String,
    /// Step limit of each agent.
    pub max_steps: usize,
}

impl Default for TitleOptions {
    fn default() -> Self {
        Self {
            root_model: DEFAULT_AGENT_MODEL.to_owned(),
            extractor_model: DEFAULT_AGENT_MODEL.to_owned(),
            extraction_model: tools::DEFAULT_MODEL.to_owned(),
            extraction_prompt: tools::TITLE_PROMPT.to_owned(),
            max_steps: Agent::DEFAULT_MAX_STEPS,
        }
    }
}

impl TitleOptions {
    /// Build the extractor agent.
    #[must_use]
    pub fn title_extractor_agent(&self, provider: SharedChatProvider) -> Agent {
        let tool = ExtractTitleTool::new(Arc::clone(&provider))
            .with_model(&self.extraction_model)
            .with_prompt(&self.extraction_prompt);
        Agent::new(TITLE_EXTRACTOR_NAME)
            .description(TITLE_EXTRACTOR_DESCRIPTION)
            .instructions(TITLE_EXTRACTOR_INSTRUCTIONS)
            .model(&self.extractor_model)
            .max_steps(self.max_steps)
            .provider(provider)
            .tool(Box::new(tool))
    }

    /// Build the root agent around `extractor`.
    #[must_use]
    pub fn root_agent(&self, provider: SharedChatProvider, extractor: Agent) -> Agent {
        Agent::new(ROOT_AGENT_NAME)
            .description(ROOT_DESCRIPTION)
            .instructions(ROOT_INSTRUCTIONS)
            .model(&self.root_model)
            .max_steps(self.max_steps)
            .provider(provider)
            .tool(Box::new(LoadArtifactsTool))
            .managed_agent(extractor)
    }

    /// Build the full application.
    #[must_use]
    pub fn app(&self, provider: SharedChatProvider) -> App {
        let extractor = self.title_extractor_agent(Arc::clone(&provider));
        App::new(APP_NAME, self.root_agent(provider, extractor)).plugin(SaveFilesAsArtifactsPlugin)
    }
}

/// The extractor agent with default options.
#[must_use]
pub fn title_extractor_agent(provider: SharedChatProvider) -> Agent {
    TitleOptions::default().title_extractor_agent(provider)
}

/// The root agent with default options.
#[must_use]
pub fn root_agent(provider: SharedChatProvider, extractor: Agent) -> Agent {
    TitleOptions::default().root_agent(provider, extractor)
}

/// The title application with default options.
#[must_use]
pub fn title_app(provider: SharedChatProvider) -> App {
    TitleOptions::default().app(provider)
}
