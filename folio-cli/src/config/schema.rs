//! Configuration schema definitions.
//!
//! Every section has defaults, so an empty file (or no file) is a valid
//! configuration.

use folio::llms::GeminiConfig;
use folio::title::{APP_NAME, DEFAULT_AGENT_MODEL, TitleOptions};
use folio::tools;
use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfigResult};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FolioConfig {
    /// Application identity.
    #[serde(default)]
    pub app: AppConfig,

    /// Gemini connection settings.
    #[serde(default)]
    pub gemini: GeminiSettings,

    /// Agent models and limits.
    #[serde(default)]
    pub agents: AgentsConfig,

    /// Title extraction call.
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

/// `[app]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name; scopes stored artifacts.
    #[serde(default = "default_app_name")]
    pub name: String,
    /// User identifier used for sessions.
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

fn default_app_name() -> String {
    APP_NAME.to_string()
}

fn default_user_id() -> String {
    "user".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            user_id: default_user_id(),
        }
    }
}

/// `[gemini]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiSettings {
    /// Developer API key. Falls back to `GEMINI_API_KEY` / `GOOGLE_API_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Vertex AI project. Selects Vertex when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertex_project: Option<String>,
    /// Vertex AI location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertex_location: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

const fn default_timeout() -> u64 {
    120
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            vertex_project: None,
            vertex_location: None,
            timeout_secs: default_timeout(),
        }
    }
}

/// `[agents]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentsConfig {
    /// Model of the root agent.
    #[serde(default = "default_agent_model")]
    pub root_model: String,
    /// Model of the title extractor agent.
    #[serde(default = "default_agent_model")]
    pub extractor_model: String,
    /// Maximum reasoning steps per agent.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

fn default_agent_model() -> String {
    DEFAULT_AGENT_MODEL.to_string()
}

const fn default_max_steps() -> usize {
    folio::agent::Agent::DEFAULT_MAX_STEPS
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            root_model: default_agent_model(),
            extractor_model: default_agent_model(),
            max_steps: default_max_steps(),
        }
    }
}

/// `[extraction]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Model the document is sent to.
    #[serde(default = "default_extraction_model")]
    pub model: String,
    /// Instruction sent with the document.
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

fn default_extraction_model() -> String {
    tools::DEFAULT_MODEL.to_string()
}

fn default_prompt() -> String {
    tools::TITLE_PROMPT.to_string()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            model: default_extraction_model(),
            prompt: default_prompt(),
        }
    }
}

impl FolioConfig {
    /// Validate the configuration and return any issues found.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.agents.max_steps == 0 {
            issues.push(ConfigIssue::error(
                "agents.max_steps",
                "Max steps must be at least 1",
            ));
        }

        if self.app.name.trim().is_empty() {
            issues.push(ConfigIssue::error("app.name", "App name must not be empty"));
        }

        if self.extraction.prompt.trim().is_empty() {
            issues.push(ConfigIssue::error(
                "extraction.prompt",
                "Extraction prompt must not be empty",
            ));
        }

        if self.gemini.timeout_secs == 0 {
            issues.push(ConfigIssue::warning(
                "gemini.timeout_secs",
                "Timeout is 0, requests will time out immediately",
            ));
        }

        if self.gemini.vertex_project.is_some() && self.gemini.api_key.is_some() {
            issues.push(ConfigIssue::warning(
                "gemini.api_key",
                "Ignored because gemini.vertex_project selects Vertex AI",
            ));
        }

        issues
    }

    /// Check if the configuration is valid (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate()
            .iter()
            .all(|issue| issue.level != IssueLevel::Error)
    }

    /// Merge environment variables into the configuration.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_lookup(|name| std::env::var(name).ok())
    }

    /// Fill unset values from `lookup`.
    #[must_use]
    pub fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if self.gemini.api_key.is_none() {
            self.gemini.api_key = var("GEMINI_API_KEY").or_else(|| var("GOOGLE_API_KEY"));
        }
        if self.gemini.base_url.is_none() {
            self.gemini.base_url = var("GEMINI_BASE_URL");
        }
        if self.gemini.vertex_project.is_none()
            && var("GOOGLE_GENAI_USE_VERTEXAI")
                .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"))
        {
            self.gemini.vertex_project = var("GOOGLE_CLOUD_PROJECT");
        }
        if self.gemini.vertex_location.is_none() {
            self.gemini.vertex_location = var("GOOGLE_CLOUD_LOCATION");
        }
        self
    }

    /// Build the Gemini client configuration.
    ///
    /// Vertex AI is used when `gemini.vertex_project` is set; the access token
    /// is read from `GOOGLE_ACCESS_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when no credential is available.
    pub fn gemini_config(&self) -> ConfigResult<GeminiConfig> {
        self.gemini_config_with(|name| std::env::var(name).ok())
    }

    /// [`gemini_config`](Self::gemini_config) with an explicit variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when no credential is available.
    pub fn gemini_config_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<GeminiConfig> {
        let settings = &self.gemini;
        let mut config = if let Some(project) = &settings.vertex_project {
            let token = lookup("GOOGLE_ACCESS_TOKEN")
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingField("GOOGLE_ACCESS_TOKEN".to_string()))?;
            let location = settings
                .vertex_location
                .clone()
                .unwrap_or_else(|| GeminiConfig::DEFAULT_LOCATION.to_string());
            GeminiConfig::vertex(project, location, token)
        } else {
            let key = settings
                .api_key
                .clone()
                .ok_or_else(|| ConfigError::MissingField("gemini.api_key".to_string()))?;
            GeminiConfig::new(key)
        };

        if let Some(url) = &settings.base_url {
            config = config.with_base_url(url);
        }
        Ok(config
            .with_model(&self.extraction.model)
            .with_timeout(settings.timeout_secs))
    }

    /// Agent and extraction settings for the title app.
    #[must_use]
    pub fn title_options(&self) -> TitleOptions {
        TitleOptions {
            root_model: self.agents.root_model.clone(),
            extractor_model: self.agents.extractor_model.clone(),
            extraction_model: self.extraction.model.clone(),
            extraction_prompt: self.extraction.prompt.clone(),
            max_steps: self.agents.max_steps,
        }
    }
}

/// Configuration validation issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Issue severity level.
    pub level: IssueLevel,
    /// Configuration path (e.g., "agents.max_steps").
    pub path: String,
    /// Human-readable message.
    pub message: String,
}

impl ConfigIssue {
    /// Create an error-level issue.
    #[must_use]
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a warning-level issue.
    #[must_use]
    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.level {
            IssueLevel::Error => "ERROR",
            IssueLevel::Warning => "WARN",
        };
        write!(f, "[{prefix}] {}: {}", self.path, self.message)
    }
}

/// Issue severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    /// Configuration cannot be used.
    Error,
    /// Configuration works but is probably not what was intended.
    Warning,
}
