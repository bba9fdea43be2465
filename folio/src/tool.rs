//! Tool trait and utilities for defining agent tools.
//!
//! Tools are the way agents reach outside the conversation: the artifact
//! store, a second model call, another agent. Each tool is a typed
//! [`Tool`] implementation; agents hold them type-erased as [`BoxedTool`].
//!
//! Every call receives the [`ToolContext`] of the running invocation, which
//! carries the artifact scope and store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::ToolContext;
use crate::error::ToolError;

/// A type alias for `Result<T, ToolError>`.
pub type ToolResult<T> = Result<T, ToolError>;

/// Definition of a tool for model function calling.
///
/// Provider-neutral; each LLM client converts it into its own wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Name of the tool (e.g., "load_artifacts").
    pub name: String,

    /// Description of what the tool does.
    /// This helps the model decide when to use the tool.
    pub description: String,

    /// JSON schema for the tool's parameters.
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a new tool definition.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Returns the tool name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tool description.
    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Schema for a tool that takes no arguments.
#[must_use]
pub fn empty_parameters() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {}
    })
}

/// The core trait for all tools that agents can use.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Static name of the tool.
    const NAME: &'static str;

    /// Arguments type for the tool.
    type Args: for<'de> Deserialize<'de> + Send;

    /// Output type of the tool.
    type Output: Serialize + Send;

    /// Error type for tool execution.
    type Error: Into<ToolError> + Send;

    /// Get the name of the tool.
    fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Get the description of the tool.
    fn description(&self) -> String;

    /// Get the JSON schema for the tool's parameters.
    fn parameters_schema(&self) -> Value {
        empty_parameters()
    }

    /// Execute the tool with the given arguments.
    async fn call(&self, ctx: &ToolContext, args: Self::Args) -> Result<Self::Output, Self::Error>;

    /// Get the tool definition for model function calling.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters_schema())
    }

    /// Call the tool with JSON arguments and return JSON output.
    ///
    /// Arguments may arrive as an object or as a JSON-encoded string.
    /// A `null` is treated as an empty object.
    async fn call_json(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError>
    where
        Self::Output: 'static,
    {
        let typed_args: Self::Args = match args {
            Value::String(s) => {
                serde_json::from_str(&s).map_err(|e| ToolError::InvalidArguments(e.to_string()))?
            }
            Value::Null => serde_json::from_value(Value::Object(serde_json::Map::new()))
                .map_err(|e| ToolError::InvalidArguments(e.to_string()))?,
            other => serde_json::from_value(other)
                .map_err(|e| ToolError::InvalidArguments(e.to_string()))?,
        };

        let result = self.call(ctx, typed_args).await.map_err(Into::into)?;
        serde_json::to_value(result).map_err(|e| ToolError::Execution(e.to_string()))
    }
}

/// A boxed dynamic tool that can be used in collections.
pub type BoxedTool = Box<dyn DynTool>;

/// Object-safe version of the Tool trait for dynamic dispatch.
#[async_trait]
pub trait DynTool: Send + Sync {
    /// Get the name of the tool.
    fn name(&self) -> &str;

    /// Get the description of the tool.
    fn description(&self) -> String;

    /// Get the tool definition.
    fn definition(&self) -> ToolDefinition;

    /// Call the tool with JSON arguments.
    async fn call_json(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError>;
}

#[async_trait]
impl<T: Tool + 'static> DynTool for T
where
    T::Output: 'static,
{
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn description(&self) -> String {
        Tool::description(self)
    }

    fn definition(&self) -> ToolDefinition {
        Tool::definition(self)
    }

    async fn call_json(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        Tool::call_json(self, ctx, args).await
    }
}

/// Result of a tool call execution.
#[derive(Debug, Clone)]
pub struct ToolCallResult {
    /// The tool call ID.
    pub id: String,
    /// The tool name.
    pub name: String,
    /// The result of execution (success value or error).
    pub result: Result<Value, ToolError>,
}

impl ToolCallResult {
    /// Create a successful result.
    #[must_use]
    pub fn success(id: impl Into<String>, name: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            result: Ok(value),
        }
    }

    /// Create a failed result.
    #[must_use]
    pub fn failure(id: impl Into<String>, name: impl Into<String>, error: ToolError) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            result: Err(error),
        }
    }

    /// Check if the call was successful.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Render the result as the observation text sent back to the model.
    ///
    /// String outputs are passed through unquoted.
    #[must_use]
    pub fn to_observation(&self) -> String {
        match &self.result {
            Ok(Value::String(s)) => s.clone(),
            Ok(value) => value.to_string(),
            Err(e) => format!("Tool error: {e}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[derive(Deserialize)]
    struct EchoArgs {
        #[serde(default)]
        text: String,
    }

    #[async_trait]
    impl Tool for Echo {
        const NAME: &'static str = "echo";
        type Args = EchoArgs;
        type Output = String;
        type Error = ToolError;

        fn description(&self) -> String {
            "Echoes its input.".into()
        }

        fn parameters_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": { "text": { "type": "string" } }
            })
        }

        async fn call(&self, _ctx: &ToolContext, args: EchoArgs) -> Result<String, ToolError> {
            if args.text == "fail" {
                return Err(ToolError::execution("asked to fail"));
            }
            Ok(args.text)
        }
    }

    mod definition {
        use super::*;

        #[test]
        fn built_from_trait_methods() {
            let def = Tool::definition(&Echo);
            assert_eq!(def.name(), "echo");
            assert_eq!(def.description(), "Echoes its input.");
            assert_eq!(def.parameters["properties"]["text"]["type"], "string");
        }

        #[test]
        fn empty_parameters_is_object_schema() {
            let schema = empty_parameters();
            assert_eq!(schema["type"], "object");
            assert!(schema["properties"].as_object().unwrap().is_empty());
        }
    }

    mod call_json {
        use super::*;

        #[tokio::test]
        async fn accepts_object_args() {
            let ctx = ToolContext::detached();
            let out = Tool::call_json(&Echo, &ctx, json!({"text": "hi"})).await.unwrap();
            assert_eq!(out, json!("hi"));
        }

        #[tokio::test]
        async fn accepts_string_encoded_args() {
            let ctx = ToolContext::detached();
            let out = Tool::call_json(&Echo, &ctx, json!("{\"text\":\"hi\"}")).await.unwrap();
            assert_eq!(out, json!("hi"));
        }

        #[tokio::test]
        async fn null_args_become_empty_object() {
            let ctx = ToolContext::detached();
            let out = Tool::call_json(&Echo, &ctx, Value::Null).await.unwrap();
            assert_eq!(out, json!(""));
        }

        #[tokio::test]
        async fn invalid_args_are_reported() {
            let ctx = ToolContext::detached();
            let err = Tool::call_json(&Echo, &ctx, json!({"text": 5})).await.unwrap_err();
            assert!(matches!(err, ToolError::InvalidArguments(_)));
        }

        #[tokio::test]
        async fn dyn_dispatch_forwards() {
            let ctx = ToolContext::detached();
            let boxed: BoxedTool = Box::new(Echo);
            assert_eq!(boxed.name(), "echo");
            let err = boxed.call_json(&ctx, json!({"text": "fail"})).await.unwrap_err();
            assert!(matches!(err, ToolError::Execution(_)));
        }
    }

    mod call_result {
        use super::*;

        #[test]
        fn string_output_is_unquoted() {
            let r = ToolCallResult::success("c", "t", json!("Title"));
            assert_eq!(r.to_observation(), "Title");
        }

        #[test]
        fn object_output_is_json() {
            let r = ToolCallResult::success("c", "t", json!({"a": 1}));
            assert_eq!(r.to_observation(), "{\"a\":1}");
        }

        #[test]
        fn failure_is_prefixed() {
            let r = ToolCallResult::failure("c", "t", ToolError::execution("boom"));
            assert!(!r.is_success());
            assert!(r.to_observation().starts_with("Tool error: "));
            assert!(r.to_observation().contains("boom"));
        }
    }
}
