//! Application wiring.
//!
//! An [`App`] binds a name, a root [`Agent`], a list of [`Plugin`]s and an
//! artifact store. Each call to [`App::run`] is one user turn: it builds a
//! fresh [`ToolContext`], lets the plugins rewrite the incoming message, then
//! runs the root agent against the session's history.
//!
//! # Example
//!
//! ```rust,ignore
//! use folio::prelude::*;
//!
//! let app = title_app(gemini);
//! let session = AppSession::new("user", "session-1");
//! let result = app.run(&session, vec![ContentPart::text("Title?"), upload]).await?;
//! println!("{}", result.output);
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{Instrument, debug, info_span};

use crate::agent::{Agent, RunConfig, RunResult, UserInput};
use crate::artifact::{ArtifactScope, InMemoryArtifactService, SharedArtifactService};
use crate::context::ToolContext;
use crate::error::Result;
use crate::memory::{InMemorySession, SharedSession};
use crate::plugin::{BoxedPlugin, Plugin};

/// Identity and history of one conversation with an [`App`].
#[derive(Clone)]
pub struct AppSession {
    user_id: String,
    session_id: String,
    history: SharedSession,
}

impl AppSession {
    /// Create a session with empty in-memory history.
    #[must_use]
    pub fn new(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        let session_id = session_id.into();
        Self {
            history: Arc::new(InMemorySession::new(session_id.clone())),
            user_id: user_id.into(),
            session_id,
        }
    }

    /// Use `history` instead of a fresh in-memory session.
    #[must_use]
    pub fn with_history(mut self, history: SharedSession) -> Self {
        self.history = history;
        self
    }

    /// The user identifier.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The session identifier.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The conversation history.
    #[must_use]
    pub const fn history(&self) -> &SharedSession {
        &self.history
    }
}

impl fmt::Debug for AppSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSession")
            .field("user_id", &self.user_id)
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

/// A named application around a root agent.
pub struct App {
    name: String,
    root_agent: Agent,
    plugins: Vec<BoxedPlugin>,
    artifacts: SharedArtifactService,
}

impl App {
    /// Create an app backed by an in-memory artifact store.
    #[must_use]
    pub fn new(name: impl Into<String>, root_agent: Agent) -> Self {
        Self {
            name: name.into(),
            root_agent,
            plugins: Vec::new(),
            artifacts: Arc::new(InMemoryArtifactService::new()),
        }
    }

    /// Add a plugin. Plugins run in the order they were added.
    #[must_use]
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Replace the artifact store.
    #[must_use]
    pub fn artifact_service(mut self, artifacts: SharedArtifactService) -> Self {
        self.artifacts = artifacts;
        self
    }

    /// The app name, used as the artifact scope's `app_name`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The root agent.
    #[must_use]
    pub const fn root_agent(&self) -> &Agent {
        &self.root_agent
    }

    /// The artifact store.
    #[must_use]
    pub const fn artifacts(&self) -> &SharedArtifactService {
        &self.artifacts
    }

    /// Names of the installed plugins.
    #[must_use]
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// The artifact scope of `session`.
    #[must_use]
    pub fn scope(&self, session: &AppSession) -> ArtifactScope {
        ArtifactScope::new(&self.name, &session.user_id, &session.session_id)
    }

    /// Handle one user turn.
    ///
    /// # Errors
    ///
    /// Propagates errors from the root agent's run.
    pub async fn run(&self, session: &AppSession, input: impl Into<UserInput>) -> Result<RunResult> {
        let invocation_id = uuid::Uuid::new_v4().to_string();
        let span = info_span!(
            "invocation",
            app = %self.name,
            user_id = %session.user_id,
            session_id = %session.session_id,
            invocation_id = %invocation_id,
        );

        let ctx = ToolContext::new(self.scope(session), invocation_id, Arc::clone(&self.artifacts));
        let mut message = input.into().into_message();

        async move {
            for plugin in &self.plugins {
                debug!(plugin = plugin.name(), "Running plugin");
                plugin.on_user_message(&ctx, &mut message).await;
            }

            let config = RunConfig::new()
                .session(Arc::clone(&session.history))
                .context(ctx);
            self.root_agent.run(message, config).await
        }
        .instrument(span)
        .await
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("name", &self.name)
            .field("root_agent", &self.root_agent.name())
            .field("plugins", &self.plugin_names())
            .finish_non_exhaustive()
    }
}
