//! Artifact storage.
//!
//! Artifacts are named binary objects (an uploaded PDF, an image) kept for
//! the lifetime of a conversation. Names are unique within an
//! [`ArtifactScope`]; saving under an existing name replaces the bytes.
//!
//! The [`ArtifactService`] trait is the seam between agents and storage.
//! [`InMemoryArtifactService`] is the bundled implementation.

mod in_memory;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use in_memory::InMemoryArtifactService;

/// A stored artifact: raw bytes, a MIME type and an optional display name.
///
/// Artifacts share their representation with inline message data so an
/// uploaded part can be stored and a loaded artifact sent to a model
/// without conversion.
pub type Artifact = crate::message::Blob;

/// The namespace an artifact lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactScope {
    /// Application name.
    pub app_name: String,
    /// User identifier.
    pub user_id: String,
    /// Session identifier.
    pub session_id: String,
}

impl ArtifactScope {
    /// Create a new scope.
    #[must_use]
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }
}

impl fmt::Display for ArtifactScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.app_name, self.user_id, self.session_id)
    }
}

/// Storage backend for artifacts.
///
/// Implementations choose the order [`list`](Self::list) returns names in.
/// Callers that treat the last listed name as the most recent upload rely
/// on the implementation documenting that order; [`InMemoryArtifactService`]
/// does, others need not.
#[async_trait]
pub trait ArtifactService: Send + Sync {
    /// Store `artifact` under `name`, replacing any existing artifact.
    async fn save(&self, scope: &ArtifactScope, name: &str, artifact: Artifact) -> Result<()>;

    /// Load the artifact stored under `name`, or `None` if there is none.
    async fn load(&self, scope: &ArtifactScope, name: &str) -> Result<Option<Artifact>>;

    /// List the names stored in `scope`.
    async fn list(&self, scope: &ArtifactScope) -> Result<Vec<String>>;
}

/// Type alias for an Arc-wrapped [`ArtifactService`].
pub type SharedArtifactService = Arc<dyn ArtifactService>;
