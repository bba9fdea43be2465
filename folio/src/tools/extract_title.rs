//! Title extraction from the most recently uploaded document.
//!
//! [`extract_title`] lists the artifacts visible to the invocation, loads the
//! last one, sends its bytes to a model together with a fixed instruction and
//! returns the trimmed reply. It never fails: every error is folded into a
//! string starting with [`FAILURE_PREFIX`], which the calling agent relays to
//! the user.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::chat::{ChatProvider, ChatRequest, SharedChatProvider};
use crate::context::ToolContext;
use crate::error::{Error, ToolError};
use crate::message::{ContentPart, Message};
use crate::tool::Tool;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Instruction sent after the document.
pub const TITLE_PROMPT: &str =
    "Extract the main title of this document. Return ONLY the title text, nothing else.";

/// MIME type assumed when an artifact does not declare one.
pub const FALLBACK_MIME_TYPE: &str = "application/pdf";

/// Prefix of every failure string.
pub const FAILURE_PREFIX: &str = "Gemini extraction failed: ";

#[derive(Debug, thiserror::Error)]
enum ExtractError {
    #[error("no artifacts available")]
    NoArtifacts,
    #[error("model returned no text")]
    EmptyResponse,
    #[error("provider '{0}' does not accept inline documents")]
    InlineDataUnsupported(String),
    #[error(transparent)]
    Folio(#[from] Error),
}

/// Extract the title of the last listed artifact.
///
/// Returns the model's answer with surrounding whitespace removed, or
/// `"Gemini extraction failed: {error}"`.
pub async fn extract_title(
    ctx: &ToolContext,
    provider: &dyn ChatProvider,
    model: &str,
    prompt: &str,
) -> String {
    match try_extract(ctx, provider, model, prompt).await {
        Ok(title) => title,
        Err(e) => {
            warn!(error = %e, "Title extraction failed");
            format!("{FAILURE_PREFIX}{e}")
        }
    }
}

async fn try_extract(
    ctx: &ToolContext,
    provider: &dyn ChatProvider,
    model: &str,
    prompt: &str,
) -> Result<String, ExtractError> {
    if !provider.supports_inline_data() {
        return Err(ExtractError::InlineDataUnsupported(
            provider.provider_name().to_owned(),
        ));
    }

    let names = ctx.list_artifacts().await?;
    debug!(artifacts = ?names, "Listed artifacts");
    let latest = names.last().ok_or(ExtractError::NoArtifacts)?;

    let mut artifact = ctx.load_artifact(latest).await?;
    if artifact.mime_type.trim().is_empty() {
        artifact.mime_type = FALLBACK_MIME_TYPE.to_owned();
    }
    debug!(
        name = %latest,
        display_name = artifact.display_name.as_deref().unwrap_or_default(),
        mime_type = %artifact.mime_type,
        bytes = artifact.len(),
        "Sending artifact for title extraction",
    );

    let request = ChatRequest::new(model).message(Message::user_parts(vec![
        ContentPart::inline_data(artifact),
        ContentPart::text(prompt),
    ]));
    let response = provider.chat(&request).await?;

    let text = response.text().unwrap_or_default();
    let title = text.trim();
    if title.is_empty() {
        return Err(ExtractError::EmptyResponse);
    }
    Ok(title.to_owned())
}

/// Arguments of [`ExtractTitleTool`]; it takes none.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ExtractTitleArgs {}

/// Tool wrapper around [`extract_title`].
#[derive(Clone)]
pub struct ExtractTitleTool {
    provider: SharedChatProvider,
    model: String,
    prompt: String,
}

impl ExtractTitleTool {
    /// Create the tool with the default model and prompt.
    #[must_use]
    pub fn new(provider: SharedChatProvider) -> Self {
        Self {
            provider,
            model: DEFAULT_MODEL.to_owned(),
            prompt: TITLE_PROMPT.to_owned(),
        }
    }

    /// Set the model used for extraction.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Replace the extraction instruction.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// The configured model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for ExtractTitleTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractTitleTool")
            .field("provider", &self.provider.provider_name())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl Tool for ExtractTitleTool {
    const NAME: &'static str = "extract_title_with_gemini";
    type Args = ExtractTitleArgs;
    type Output = String;
    type Error = ToolError;

    fn description(&self) -> String {
        "Sends the most recently uploaded document to Gemini and returns its title.".to_owned()
    }

    async fn call(&self, ctx: &ToolContext, _args: ExtractTitleArgs) -> Result<String, ToolError> {
        Ok(extract_title(ctx, self.provider.as_ref(), &self.model, &self.prompt).await)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::artifact::{
        Artifact, ArtifactScope, ArtifactService, InMemoryArtifactService, SharedArtifactService,
    };
    use crate::error::{ArtifactError, LlmError, Result};
    use crate::llms::MockChatProvider;
    use crate::message::Role;
    use crate::tool::DynTool;

    /// Wraps the in-memory store, records loads and can be told to fail.
    #[derive(Default)]
    struct RecordingStore {
        inner: InMemoryArtifactService,
        loads: Mutex<Vec<String>>,
        fail_list: bool,
        fail_load: bool,
    }

    #[async_trait]
    impl ArtifactService for RecordingStore {
        async fn save(&self, scope: &ArtifactScope, name: &str, artifact: Artifact) -> Result<()> {
            self.inner.save(scope, name, artifact).await
        }

        async fn load(&self, scope: &ArtifactScope, name: &str) -> Result<Option<Artifact>> {
            self.loads.lock().unwrap().push(name.to_owned());
            if self.fail_load {
                return Err(ArtifactError::storage("bucket unavailable").into());
            }
            self.inner.load(scope, name).await
        }

        async fn list(&self, scope: &ArtifactScope) -> Result<Vec<String>> {
            if self.fail_list {
                return Err(ArtifactError::storage("listing denied").into());
            }
            self.inner.list(scope).await
        }
    }

    fn scope() -> ArtifactScope {
        ArtifactScope::new("agent_read_artifact", "user", "s")
    }

    async fn context_with(
        store: RecordingStore,
        files: &[(&str, &str)],
    ) -> (ToolContext, Arc<RecordingStore>) {
        let store = Arc::new(store);
        let shared: SharedArtifactService = store.clone();
        let ctx = ToolContext::new(scope(), "inv-1", shared);
        for (name, body) in files {
            ctx.save_artifact(
                name,
                Artifact::new("application/pdf", body.as_bytes()).with_display_name(*name),
            )
            .await
            .unwrap();
        }
        (ctx, store)
    }

    mod selection {
        use super::*;

        #[tokio::test]
        async fn loads_exactly_the_last_listed_artifact() {
            let (ctx, store) = context_with(
                RecordingStore::default(),
                &[("a.pdf", "A"), ("b.pdf", "B"), ("c.pdf", "C")],
            )
            .await;
            let mock = MockChatProvider::new().push_text("Title C");

            let title = extract_title(&ctx, &mock, DEFAULT_MODEL, TITLE_PROMPT).await;

            assert_eq!(title, "Title C");
            assert_eq!(*store.loads.lock().unwrap(), vec!["c.pdf"]);
            let request = mock.last_request().unwrap();
            let blob = request.messages[0].inline_data().next().unwrap();
            assert_eq!(blob.data, b"C");
        }
    }

    mod request_shape {
        use super::*;

        #[tokio::test]
        async fn inline_data_then_prompt_with_model() {
            let (ctx, _) = context_with(RecordingStore::default(), &[("paper.pdf", "%PDF-1.7")]).await;
            let mock = MockChatProvider::new().push_text("A Paper");

            extract_title(&ctx, &mock, "gemini-2.5-flash", TITLE_PROMPT).await;

            let request = mock.last_request().unwrap();
            assert_eq!(request.model, "gemini-2.5-flash");
            assert_eq!(request.messages.len(), 1);
            let msg = &request.messages[0];
            assert_eq!(msg.role, Role::User);
            let parts = msg.content.clone().unwrap().into_parts();
            assert_eq!(parts.len(), 2);
            let blob = parts[0].as_inline_data().unwrap();
            assert_eq!(blob.mime_type, "application/pdf");
            assert_eq!(blob.data, b"%PDF-1.7");
            assert_eq!(
                parts[1].as_text(),
                Some("Extract the main title of this document. Return ONLY the title text, nothing else.")
            );
        }

        #[tokio::test]
        async fn blank_mime_type_falls_back_to_pdf() {
            let (ctx, _) = context_with(RecordingStore::default(), &[]).await;
            ctx.save_artifact("upload", Artifact::new("", b"x".to_vec()))
                .await
                .unwrap();
            let mock = MockChatProvider::new().push_text("T");

            extract_title(&ctx, &mock, DEFAULT_MODEL, TITLE_PROMPT).await;

            let request = mock.last_request().unwrap();
            let blob = request.messages[0].inline_data().next().unwrap();
            assert_eq!(blob.mime_type, FALLBACK_MIME_TYPE);
        }

        #[tokio::test]
        async fn declared_mime_type_is_kept() {
            let (ctx, _) = context_with(RecordingStore::default(), &[]).await;
            ctx.save_artifact("scan.png", Artifact::new("image/png", b"png".to_vec()))
                .await
                .unwrap();
            let mock = MockChatProvider::new().push_text("T");

            extract_title(&ctx, &mock, DEFAULT_MODEL, TITLE_PROMPT).await;

            let request = mock.last_request().unwrap();
            assert_eq!(request.messages[0].inline_data().next().unwrap().mime_type, "image/png");
        }
    }

    mod outcomes {
        use super::*;

        #[tokio::test]
        async fn response_is_trimmed() {
            let (ctx, _) = context_with(RecordingStore::default(), &[("a.pdf", "A")]).await;
            let mock = MockChatProvider::new().push_text("  Attention Is All You Need\n");
            let title = extract_title(&ctx, &mock, DEFAULT_MODEL, TITLE_PROMPT).await;
            assert_eq!(title, "Attention Is All You Need");
        }

        #[tokio::test]
        async fn load_error_becomes_failure_string() {
            let store = RecordingStore {
                fail_load: true,
                ..RecordingStore::default()
            };
            let (ctx, _) = context_with(store, &[("a.pdf", "A")]).await;
            let mock = MockChatProvider::new();

            let out = extract_title(&ctx, &mock, DEFAULT_MODEL, TITLE_PROMPT).await;

            assert!(out.starts_with("Gemini extraction failed: "));
            assert!(out.contains("bucket unavailable"));
            assert!(mock.requests().is_empty());
        }

        #[tokio::test]
        async fn remote_error_becomes_failure_string() {
            let (ctx, _) = context_with(RecordingStore::default(), &[("a.pdf", "A")]).await;
            let mock = MockChatProvider::new().push_error(LlmError::provider_code(
                "gemini",
                "NOT_FOUND",
                "Publisher model was not found",
            ));

            let out = extract_title(&ctx, &mock, DEFAULT_MODEL, TITLE_PROMPT).await;

            let expected_error = Error::from(LlmError::provider_code(
                "gemini",
                "NOT_FOUND",
                "Publisher model was not found",
            ));
            assert_eq!(out, format!("Gemini extraction failed: {expected_error}"));
        }

        #[tokio::test]
        async fn empty_store_becomes_failure_string() {
            let (ctx, _) = context_with(RecordingStore::default(), &[]).await;
            let out = extract_title(&ctx, &MockChatProvider::new(), DEFAULT_MODEL, TITLE_PROMPT).await;
            assert_eq!(out, "Gemini extraction failed: no artifacts available");
        }

        #[tokio::test]
        async fn list_error_becomes_failure_string() {
            let store = RecordingStore {
                fail_list: true,
                ..RecordingStore::default()
            };
            let (ctx, _) = context_with(store, &[]).await;
            let out = extract_title(&ctx, &MockChatProvider::new(), DEFAULT_MODEL, TITLE_PROMPT).await;
            assert!(out.starts_with(FAILURE_PREFIX));
            assert!(out.contains("listing denied"));
        }

        #[tokio::test]
        async fn text_only_provider_is_refused() {
            let (ctx, store) = context_with(RecordingStore::default(), &[("a.pdf", "A")]).await;
            let mock = MockChatProvider::new().with_inline_data(false);
            let out = extract_title(&ctx, &mock, DEFAULT_MODEL, TITLE_PROMPT).await;
            assert_eq!(
                out,
                "Gemini extraction failed: provider 'mock' does not accept inline documents"
            );
            assert!(store.loads.lock().unwrap().is_empty());
        }

        #[tokio::test]
        async fn blank_response_becomes_failure_string() {
            let (ctx, _) = context_with(RecordingStore::default(), &[("a.pdf", "A")]).await;
            let mock = MockChatProvider::new().push_text("   \n");
            let out = extract_title(&ctx, &mock, DEFAULT_MODEL, TITLE_PROMPT).await;
            assert_eq!(out, "Gemini extraction failed: model returned no text");
        }
    }

    mod tool {
        use super::*;

        #[tokio::test]
        async fn tool_returns_title_as_json_string() {
            let (ctx, _) = context_with(RecordingStore::default(), &[("a.pdf", "A")]).await;
            let mock = Arc::new(MockChatProvider::new().push_text("The Title"));
            let tool = ExtractTitleTool::new(Arc::clone(&mock) as _).with_model("gemini-2.0-flash");

            let out = DynTool::call_json(&tool, &ctx, json!({})).await.unwrap();

            assert_eq!(out, json!("The Title"));
            assert_eq!(mock.last_request().unwrap().model, "gemini-2.0-flash");
        }

        #[test]
        fn definition_has_no_required_args() {
            let tool = ExtractTitleTool::new(Arc::new(MockChatProvider::new()));
            let def = DynTool::definition(&tool);
            assert_eq!(def.name, "extract_title_with_gemini");
            assert!(def.parameters["properties"].as_object().unwrap().is_empty());
            assert_eq!(tool.model(), DEFAULT_MODEL);
        }

        #[tokio::test]
        async fn custom_prompt_is_sent() {
            let (ctx, _) = context_with(RecordingStore::default(), &[("a.pdf", "A")]).await;
            let mock = Arc::new(MockChatProvider::new().push_text("x"));
            let tool = ExtractTitleTool::new(Arc::clone(&mock) as _).with_prompt("Title please.");

            DynTool::call_json(&tool, &ctx, serde_json::Value::Null).await.unwrap();

            let parts = mock.last_request().unwrap().messages[0]
                .content
                .clone()
                .unwrap()
                .into_parts();
            assert_eq!(parts[1].as_text(), Some("Title please."));
        }
    }
}
