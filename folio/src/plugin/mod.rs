//! App-level plugins.
//!
//! A [`Plugin`] observes every incoming user message before the root agent
//! sees it, and may rewrite it. Methods have default no-op implementations so
//! a plugin only overrides the events it needs.
//!
//! # Object Safety
//!
//! [`Plugin`] is object-safe and is held as [`BoxedPlugin`] by
//! [`App`](crate::app::App).

mod save_files;

use async_trait::async_trait;

use crate::context::ToolContext;
use crate::message::Message;

pub use save_files::SaveFilesAsArtifactsPlugin;

/// A boxed, thread-safe [`Plugin`] trait object.
pub type BoxedPlugin = Box<dyn Plugin>;

/// Hook run by the app on each user turn.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Called with the user message before the root agent runs.
    async fn on_user_message(&self, _ctx: &ToolContext, _message: &mut Message) {}
}
