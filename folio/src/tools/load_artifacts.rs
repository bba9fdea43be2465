//! Artifact discovery tool.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::context::ToolContext;
use crate::error::{ArtifactError, Error, ToolError};
use crate::tool::Tool;

/// Arguments of [`LoadArtifactsTool`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadArtifactsArgs {
    /// Names to load. Empty means "list what is available".
    #[serde(default)]
    pub artifact_names: Vec<String>,
}

/// Metadata reported for a loaded artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactInfo {
    /// MIME type.
    pub mime_type: String,
    /// Display name, when the upload carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Size of the content.
    pub size_bytes: usize,
}

/// Result of a `load_artifacts` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LoadArtifactsOutput {
    /// No names were requested; these are the names available.
    Available {
        /// Names in listing order.
        artifact_names: Vec<String>,
    },
    /// Per-name outcome for the requested names.
    Loaded {
        /// Metadata for each name found, `"not found"` otherwise.
        artifacts: BTreeMap<String, LoadOutcome>,
    },
}

/// Outcome for a single requested name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LoadOutcome {
    /// The artifact exists.
    Found(ArtifactInfo),
    /// The artifact does not exist.
    Missing(&'static str),
}

/// Lets a model see which uploads exist in the current session.
///
/// Called without arguments it lists the artifact names; called with
/// `artifact_names` it reports metadata for each requested artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadArtifactsTool;

impl LoadArtifactsTool {
    /// Create the tool.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Tool for LoadArtifactsTool {
    const NAME: &'static str = "load_artifacts";
    type Args = LoadArtifactsArgs;
    type Output = LoadArtifactsOutput;
    type Error = ToolError;

    fn description(&self) -> String {
        "Loads the artifacts uploaded in this session. Call without arguments to list \
         the available artifact names, or pass artifact_names to inspect specific files."
            .to_owned()
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "artifact_names": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Names of the artifacts to load"
                }
            }
        })
    }

    async fn call(
        &self,
        ctx: &ToolContext,
        args: LoadArtifactsArgs,
    ) -> Result<LoadArtifactsOutput, ToolError> {
        if args.artifact_names.is_empty() {
            let artifact_names = ctx.list_artifacts().await?;
            return Ok(LoadArtifactsOutput::Available { artifact_names });
        }

        let mut artifacts = BTreeMap::new();
        for name in args.artifact_names {
            let outcome = match ctx.load_artifact(&name).await {
                Ok(artifact) => LoadOutcome::Found(ArtifactInfo {
                    size_bytes: artifact.len(),
                    mime_type: artifact.mime_type,
                    display_name: artifact.display_name,
                }),
                Err(Error::Artifact(ArtifactError::NotFound(_))) => LoadOutcome::Missing("not found"),
                Err(e) => return Err(e.into()),
            };
            artifacts.insert(name, outcome);
        }
        Ok(LoadArtifactsOutput::Loaded { artifacts })
    }
}
