//! Gemini API client implementation.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde_json::Value;

use crate::chat::{ChatRequest, ToolChoice};
use crate::error::{LlmError, Result};
use crate::message::{Content, ContentPart, Message, Role};
use crate::tool::ToolDefinition;

use super::config::GeminiConfig;
use super::types::{
    FunctionCallingConfig, FunctionDeclaration, GeminiBlob, GeminiContent, GeminiErrorResponse,
    GeminiFunctionCall, GeminiFunctionResponse, GeminiPart, GeminiTool, GeminiToolConfig,
    GenerateContentRequest, GenerationConfig,
};

/// Gemini API client.
#[derive(Debug, Clone)]
pub struct Gemini {
    pub(crate) config: Arc<GeminiConfig>,
    pub(crate) client: Client,
}

impl Gemini {
    /// Create a new Gemini client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an auth error if no credential is configured, or an internal
    /// error if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            let what = if config.is_vertex() {
                "Access token is required"
            } else {
                "API key is required"
            };
            return Err(LlmError::auth("gemini", what).into());
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        let client = builder
            .build()
            .map_err(|e| LlmError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Create a client from environment variables.
    ///
    /// # Errors
    ///
    /// See [`GeminiConfig::from_env`] and [`Gemini::new`].
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    /// Get the default model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Get the client configuration.
    #[must_use]
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Build the `generateContent` URL for `model`.
    pub(crate) fn generate_url(&self, model: &str) -> String {
        let base = self.config.resolved_base_url();
        let model = model.strip_prefix("models/").unwrap_or(model);
        match &self.config.vertex {
            Some(target) => format!(
                "{base}/projects/{}/locations/{}/publishers/google/models/{model}:generateContent",
                target.project, target.location
            ),
            None => format!("{base}/models/{model}:generateContent"),
        }
    }

    /// Build a POST with the right credential header.
    pub(crate) fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let req = self
            .client
            .post(url)
            .header("Content-Type", "application/json");
        if self.config.is_vertex() {
            req.bearer_auth(&self.config.api_key)
        } else {
            req.header("x-goog-api-key", &self.config.api_key)
        }
    }

    /// Resolve the model for a request.
    pub(crate) fn request_model<'a>(&'a self, request: &'a ChatRequest) -> &'a str {
        if request.model.is_empty() {
            &self.config.model
        } else {
            &request.model
        }
    }

    fn convert_part(part: &ContentPart) -> GeminiPart {
        match part {
            ContentPart::Text { text } => GeminiPart::text(text.clone()),
            ContentPart::InlineData { inline_data } => GeminiPart {
                inline_data: Some(GeminiBlob {
                    mime_type: inline_data.mime_type.clone(),
                    data: STANDARD.encode(&inline_data.data),
                }),
                ..GeminiPart::default()
            },
        }
    }

    fn content_parts(content: Option<&Content>) -> Vec<GeminiPart> {
        match content {
            Some(Content::Text(text)) if !text.is_empty() => vec![GeminiPart::text(text.clone())],
            Some(Content::Parts(parts)) => parts.iter().map(Self::convert_part).collect(),
            _ => Vec::new(),
        }
    }

    /// Convert one message into a role and its parts.
    fn convert_message(msg: &Message) -> (&'static str, Vec<GeminiPart>) {
        match msg.role {
            Role::System | Role::User => ("user", Self::content_parts(msg.content.as_ref())),
            Role::Assistant => {
                let mut parts = Self::content_parts(msg.content.as_ref());
                for call in msg.tool_calls.iter().flatten() {
                    parts.push(GeminiPart {
                        function_call: Some(GeminiFunctionCall {
                            id: None,
                            name: call.name.clone(),
                            args: call.arguments.clone(),
                        }),
                        ..GeminiPart::default()
                    });
                }
                ("model", parts)
            }
            Role::Tool => {
                let name = msg
                    .name
                    .clone()
                    .or_else(|| msg.tool_call_id.clone())
                    .unwrap_or_default();
                let result = msg.text().unwrap_or_default();
                let part = GeminiPart {
                    function_response: Some(GeminiFunctionResponse {
                        name,
                        response: serde_json::json!({ "result": result }),
                    }),
                    ..GeminiPart::default()
                };
                ("user", vec![part])
            }
        }
    }

    /// Split messages into the system instruction and the turn list.
    ///
    /// Consecutive turns with the same role are merged; empty turns are dropped.
    pub(crate) fn convert_messages(
        messages: &[Message],
    ) -> (Option<GeminiContent>, Vec<GeminiContent>) {
        let mut system_parts = Vec::new();
        let mut contents: Vec<GeminiContent> = Vec::new();

        for msg in messages {
            if msg.role == Role::System {
                system_parts.extend(Self::content_parts(msg.content.as_ref()));
                continue;
            }
            let (role, parts) = Self::convert_message(msg);
            if parts.is_empty() {
                continue;
            }
            match contents.last_mut() {
                Some(last) if last.role.as_deref() == Some(role) => last.parts.extend(parts),
                _ => contents.push(GeminiContent {
                    role: Some(role.to_owned()),
                    parts,
                }),
            }
        }

        let system = (!system_parts.is_empty()).then(|| GeminiContent {
            role: None,
            parts: system_parts,
        });
        (system, contents)
    }

    /// Remove schema keywords the Gemini API rejects, at every level.
    pub(crate) fn clean_schema(schema: &Value) -> Value {
        match schema {
            Value::Object(map) => Value::Object(
                map.iter()
                    .filter(|(k, _)| !matches!(k.as_str(), "additionalProperties" | "$schema"))
                    .map(|(k, v)| (k.clone(), Self::clean_schema(v)))
                    .collect(),
            ),
            Value::Array(items) => Value::Array(items.iter().map(Self::clean_schema).collect()),
            other => other.clone(),
        }
    }

    /// Convert a tool definition into a function declaration.
    ///
    /// An object schema with no properties is omitted.
    pub(crate) fn convert_tool(tool: &ToolDefinition) -> FunctionDeclaration {
        let no_properties = tool
            .parameters
            .get("properties")
            .and_then(Value::as_object)
            .is_none_or(serde_json::Map::is_empty);
        FunctionDeclaration {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: (!no_properties).then(|| Self::clean_schema(&tool.parameters)),
        }
    }

    pub(crate) fn convert_tool_choice(choice: &ToolChoice) -> GeminiToolConfig {
        let (mode, allowed) = match choice {
            ToolChoice::Auto => ("AUTO", None),
            ToolChoice::Required => ("ANY", None),
            ToolChoice::None => ("NONE", None),
            ToolChoice::Function(name) => ("ANY", Some(vec![name.clone()])),
        };
        GeminiToolConfig {
            function_calling_config: FunctionCallingConfig {
                mode: mode.to_owned(),
                allowed_function_names: allowed,
            },
        }
    }

    /// Build the request body.
    pub(crate) fn build_body(request: &ChatRequest) -> GenerateContentRequest {
        let (system_instruction, contents) = Self::convert_messages(&request.messages);

        let tools = request
            .tools
            .as_ref()
            .filter(|t| !t.is_empty())
            .map(|t| {
                vec![GeminiTool {
                    function_declarations: t.iter().map(Self::convert_tool).collect(),
                }]
            });

        let generation_config = GenerationConfig {
            temperature: request.temperature,
            top_p: request.top_p,
            max_output_tokens: request.max_output_tokens,
            stop_sequences: request.stop.clone(),
        };

        GenerateContentRequest {
            contents,
            system_instruction,
            tools,
            tool_config: request.tool_choice.as_ref().map(Self::convert_tool_choice),
            generation_config: (!generation_config.is_empty()).then_some(generation_config),
        }
    }

    /// Parse an error response from Gemini.
    pub(crate) fn parse_error(status: u16, body: &str) -> LlmError {
        match status {
            401 | 403 => {
                let message = serde_json::from_str::<GeminiErrorResponse>(body)
                    .map_or_else(|_| body.to_owned(), |r| r.error.message);
                return LlmError::auth("gemini", message);
            }
            429 => return LlmError::rate_limited("gemini"),
            _ => {}
        }

        if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(body) {
            let error = error_response.error;
            let code = error
                .status
                .or_else(|| error.code.map(|c| c.to_string()))
                .unwrap_or_else(|| status.to_string());
            return LlmError::provider_code("gemini", code, error.message);
        }

        LlmError::http_status(status, body.to_owned())
    }
}
