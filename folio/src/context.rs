//! Invocation context handed to every tool call.

use std::fmt;
use std::sync::Arc;

use crate::artifact::{Artifact, ArtifactScope, InMemoryArtifactService, SharedArtifactService};
use crate::error::{ArtifactError, Result};

/// Context of a single user-message invocation.
///
/// Cloned into every tool call and into managed agents, so a sub-agent sees
/// the same artifact scope as its caller.
#[derive(Clone)]
pub struct ToolContext {
    scope: ArtifactScope,
    invocation_id: String,
    agent_name: Option<String>,
    artifacts: SharedArtifactService,
}

impl ToolContext {
    /// Create a context for `scope` backed by `artifacts`.
    #[must_use]
    pub fn new(
        scope: ArtifactScope,
        invocation_id: impl Into<String>,
        artifacts: SharedArtifactService,
    ) -> Self {
        Self {
            scope,
            invocation_id: invocation_id.into(),
            agent_name: None,
            artifacts,
        }
    }

    /// A context over a fresh, empty in-memory store.
    ///
    /// Used when an agent runs outside an [`App`](crate::app::App).
    #[must_use]
    pub fn detached() -> Self {
        Self::new(
            ArtifactScope::new("folio", "user", uuid::Uuid::new_v4().to_string()),
            uuid::Uuid::new_v4().to_string(),
            Arc::new(InMemoryArtifactService::new()),
        )
    }

    /// Set the name of the agent currently executing.
    #[must_use]
    pub fn with_agent_name(mut self, name: impl Into<String>) -> Self {
        self.agent_name = Some(name.into());
        self
    }

    /// The artifact scope.
    #[must_use]
    pub const fn scope(&self) -> &ArtifactScope {
        &self.scope
    }

    /// Identifier of the invocation this context belongs to.
    #[must_use]
    pub fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    /// Name of the agent currently executing, if set.
    #[must_use]
    pub fn agent_name(&self) -> Option<&str> {
        self.agent_name.as_deref()
    }

    /// The backing artifact store.
    #[must_use]
    pub const fn artifacts(&self) -> &SharedArtifactService {
        &self.artifacts
    }

    /// List artifact names in this context's scope.
    pub async fn list_artifacts(&self) -> Result<Vec<String>> {
        self.artifacts.list(&self.scope).await
    }

    /// Load an artifact by name, failing if it does not exist.
    pub async fn load_artifact(&self, name: &str) -> Result<Artifact> {
        self.artifacts
            .load(&self.scope, name)
            .await?
            .ok_or_else(|| ArtifactError::not_found(name).into())
    }

    /// Save an artifact in this context's scope.
    pub async fn save_artifact(&self, name: &str, artifact: Artifact) -> Result<()> {
        self.artifacts.save(&self.scope, name, artifact).await
    }
}

impl fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolContext")
            .field("scope", &self.scope)
            .field("invocation_id", &self.invocation_id)
            .field("agent_name", &self.agent_name)
            .finish_non_exhaustive()
    }
}
