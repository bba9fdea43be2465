//! In-memory session implementation.
//!
//! [`InMemorySession`] stores conversation history in a `Vec<Message>` behind
//! a `tokio::sync::RwLock`. Data is lost when the process exits.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::Session;
use crate::error::Result;
use crate::message::Message;

/// In-memory session backed by `tokio::sync::RwLock<Vec<Message>>`.
#[derive(Debug)]
pub struct InMemorySession {
    id: String,
    messages: RwLock<Vec<Message>>,
}

impl InMemorySession {
    /// Creates an empty session.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_messages(id, Vec::new())
    }

    /// Creates a session pre-populated with `messages`.
    #[must_use]
    pub fn with_messages(id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            id: id.into(),
            messages: RwLock::new(messages),
        }
    }
}

#[async_trait]
impl Session for InMemorySession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn get_messages(&self, limit: Option<usize>) -> Result<Vec<Message>> {
        let guard = self.messages.read().await;
        match limit {
            Some(n) if n < guard.len() => Ok(guard[guard.len() - n..].to_vec()),
            _ => Ok(guard.clone()),
        }
    }

    async fn add_messages(&self, messages: &[Message]) -> Result<()> {
        if messages.is_empty() {
            return Ok(());
        }
        self.messages.write().await.extend_from_slice(messages);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.messages.write().await.clear();
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.messages.read().await.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::message::Role;

    fn turns(n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(format!("question {i}"))
                } else {
                    Message::assistant(format!("answer {i}"))
                }
            })
            .collect()
    }

    mod get_messages {
        use super::*;

        #[tokio::test]
        async fn none_limit_returns_everything() {
            let session = InMemorySession::with_messages("s", turns(4));
            assert_eq!(session.get_messages(None).await.unwrap(), turns(4));
        }

        #[tokio::test]
        async fn limit_keeps_latest() {
            let all = turns(5);
            let session = InMemorySession::with_messages("s", all.clone());
            assert_eq!(session.get_messages(Some(2)).await.unwrap(), all[3..]);
            assert!(session.get_messages(Some(0)).await.unwrap().is_empty());
            assert_eq!(session.get_messages(Some(50)).await.unwrap(), all);
        }
    }

    mod mutation {
        use super::*;

        #[tokio::test]
        async fn add_appends_in_order() {
            let session = InMemorySession::new("s");
            session.add_messages(&[Message::user("hi")]).await.unwrap();
            session
                .add_messages(&[Message::assistant("hello")])
                .await
                .unwrap();

            let stored = session.get_messages(None).await.unwrap();
            assert_eq!(stored[0].role, Role::User);
            assert_eq!(stored[1].role, Role::Assistant);
        }

        #[tokio::test]
        async fn empty_add_is_noop() {
            let session = InMemorySession::new("s");
            session.add_messages(&[]).await.unwrap();
            assert!(session.is_empty().await.unwrap());
        }

        #[tokio::test]
        async fn clear_empties() {
            let session = InMemorySession::with_messages("s", turns(3));
            session.clear().await.unwrap();
            assert_eq!(session.len().await.unwrap(), 0);
            assert_eq!(session.id(), "s");
        }
    }
}
