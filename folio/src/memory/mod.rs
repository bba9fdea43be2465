//! Conversation history.
//!
//! A [`Session`] stores the messages of one conversation so that successive
//! runs of the root agent see what came before. Only text turns are kept:
//! uploaded files live in the artifact store, not in history.

mod in_memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::message::Message;

pub use in_memory::InMemorySession;

/// Persistent conversation history for an agent.
#[async_trait]
pub trait Session: Send + Sync {
    /// Unique identifier of this session.
    fn id(&self) -> &str;

    /// Retrieve messages, oldest first. `limit` keeps only the latest `n`.
    async fn get_messages(&self, limit: Option<usize>) -> Result<Vec<Message>>;

    /// Append messages to the end of the history.
    async fn add_messages(&self, messages: &[Message]) -> Result<()>;

    /// Remove all messages.
    async fn clear(&self) -> Result<()>;

    /// Number of stored messages.
    async fn len(&self) -> Result<usize>;

    /// Returns `true` if the session holds no messages.
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}

/// Type alias for an Arc-wrapped [`Session`].
pub type SharedSession = Arc<dyn Session>;
