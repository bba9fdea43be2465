//! In-memory artifact store.
//!
//! [`InMemoryArtifactService`] keeps artifacts in a map of scopes to ordered
//! entry lists behind a `tokio::sync::RwLock`. Data is lost when the value
//! is dropped.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{Artifact, ArtifactScope, ArtifactService};
use crate::error::{ArtifactError, Result};

/// In-memory artifact store.
///
/// [`list`](ArtifactService::list) returns names ordered by their most recent
/// save, oldest first: re-saving a name moves it to the end. The last listed
/// name is therefore always the latest upload.
#[derive(Debug, Default)]
pub struct InMemoryArtifactService {
    scopes: RwLock<HashMap<ArtifactScope, Vec<(String, Artifact)>>>,
}

impl InMemoryArtifactService {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ArtifactError::InvalidName(name.to_owned()).into());
    }
    Ok(())
}

#[async_trait]
impl ArtifactService for InMemoryArtifactService {
    async fn save(&self, scope: &ArtifactScope, name: &str, artifact: Artifact) -> Result<()> {
        validate_name(name)?;
        let mut guard = self.scopes.write().await;
        let entries = guard.entry(scope.clone()).or_default();
        entries.retain(|(existing, _)| existing != name);
        debug!(%scope, name, bytes = artifact.len(), "saved artifact");
        entries.push((name.to_owned(), artifact));
        Ok(())
    }

    async fn load(&self, scope: &ArtifactScope, name: &str) -> Result<Option<Artifact>> {
        let guard = self.scopes.read().await;
        Ok(guard.get(scope).and_then(|entries| {
            entries
                .iter()
                .find(|(existing, _)| existing == name)
                .map(|(_, artifact)| artifact.clone())
        }))
    }

    async fn list(&self, scope: &ArtifactScope) -> Result<Vec<String>> {
        let guard = self.scopes.read().await;
        Ok(guard
            .get(scope)
            .map(|entries| entries.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default())
    }
}
