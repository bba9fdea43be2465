//! Plugin that stores uploaded files as artifacts.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::Plugin;
use crate::context::ToolContext;
use crate::message::{Content, ContentPart, Message};

/// Stores uploaded file parts as artifacts.
///
/// Each inline-data part of a user message is saved under its display name,
/// or `artifact_{invocation_id}_{index}` when it has none, and replaced by
/// the text `[Uploaded Artifact: "{name}"]`. A part whose save fails is kept
/// as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveFilesAsArtifactsPlugin;

impl SaveFilesAsArtifactsPlugin {
    /// Create the plugin.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn placeholder(name: &str) -> ContentPart {
        ContentPart::text(format!("[Uploaded Artifact: \"{name}\"]"))
    }
}

#[async_trait]
impl Plugin for SaveFilesAsArtifactsPlugin {
    fn name(&self) -> &str {
        "save_files_as_artifacts_plugin"
    }

    async fn on_user_message(&self, ctx: &ToolContext, message: &mut Message) {
        let Some(Content::Parts(parts)) = message.content.as_mut() else {
            return;
        };

        for (index, part) in parts.iter_mut().enumerate() {
            let ContentPart::InlineData { inline_data } = part else {
                continue;
            };
            let name = inline_data
                .display_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| format!("artifact_{}_{index}", ctx.invocation_id()));

            match ctx.save_artifact(&name, inline_data.clone()).await {
                Ok(()) => {
                    debug!(name = %name, scope = %ctx.scope(), "Stored upload as artifact");
                    *part = Self::placeholder(&name);
                }
                Err(e) => warn!(name = %name, error = %e, "Failed to store upload as artifact"),
            }
        }
    }
}
