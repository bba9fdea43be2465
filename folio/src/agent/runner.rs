//! Runner, the agent execution engine.
//!
//! The [`Runner`] drives an [`Agent`] through its reasoning loop:
//!
//! 1. Build messages from instructions, session history and the user message
//! 2. Call the agent's provider with the available tools
//! 3. Classify the response into a [`NextStep`]
//! 4. Execute tool calls (managed agents included) and append the results
//! 5. Loop back to step 2 until the model answers with text
//!
//! Managed agents run as nested runs that share the parent's
//! [`ToolContext`], so they see the same artifacts.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::chat::{ChatProvider, ChatRequest, ChatResponse, ToolChoice};
use crate::context::ToolContext;
use crate::error::{Error, Result, ToolError};
use crate::message::{Message, ToolCall};
use crate::tool::{BoxedTool, ToolCallResult, ToolDefinition};
use crate::usage::Usage;

use super::config::Agent;
use super::result::{NextStep, RunConfig, RunResult, StepInfo, ToolCallRecord, UserInput};

/// Mutable state of a single run.
struct RunState<'a> {
    agent: &'a Agent,
    provider: &'a dyn ChatProvider,
    context: ToolContext,
    messages: Vec<Message>,
    user_message: Message,
    definitions: Vec<ToolDefinition>,
    step_history: Vec<StepInfo>,
    usage: Usage,
    max_steps: usize,
}

impl<'a> RunState<'a> {
    async fn init(agent: &'a Agent, input: UserInput, config: &RunConfig) -> Result<Self> {
        let provider = agent.provider.as_deref().ok_or_else(|| {
            Error::agent(format!(
                "Agent '{}' has no provider configured. Call .provider() before running.",
                agent.name
            ))
        })?;

        let mut messages = Vec::new();
        if !agent.instructions.is_empty() {
            messages.push(Message::system(&agent.instructions));
        }

        if let Some(session) = &config.session {
            messages.extend(session.get_messages(None).await?);
        }

        let user_message = input.into_message();
        messages.push(user_message.clone());

        let definitions = Runner::collect_all_definitions(agent);
        let tool_names: Vec<&str> = definitions.iter().map(ToolDefinition::name).collect();
        tracing::Span::current().record("agent.tools", tracing::field::debug(&tool_names));

        let context = config
            .context
            .clone()
            .unwrap_or_else(ToolContext::detached)
            .with_agent_name(&agent.name);

        Ok(Self {
            agent,
            provider,
            context,
            messages,
            user_message,
            definitions,
            step_history: Vec::new(),
            usage: Usage::zero(),
            max_steps: config.max_steps.unwrap_or(agent.max_steps),
        })
    }

    fn build_request(&self) -> ChatRequest {
        let mut request = ChatRequest::with_messages(&self.agent.model, self.messages.clone());
        if !self.definitions.is_empty() {
            request = request
                .tools(self.definitions.clone())
                .tool_choice(ToolChoice::Auto);
        }
        request
    }
}

/// Stateless execution engine that drives an [`Agent`] through its reasoning loop.
///
/// All per-run state lives inside the run itself, so `run` may be called
/// concurrently for the same agent.
#[derive(Debug, Clone, Copy)]
pub struct Runner;

impl Runner {
    /// Execute an agent run to completion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Agent`] if the agent has no provider,
    /// [`Error::MaxSteps`] if the step limit is reached without a text
    /// answer, and propagates provider and session errors. Tool failures do
    /// not fail the run; they are reported to the model as observations.
    pub fn run<'a>(
        agent: &'a Agent,
        input: impl Into<UserInput>,
        config: RunConfig,
    ) -> Pin<Box<dyn Future<Output = Result<RunResult>> + Send + 'a>> {
        let input = input.into();
        let span = info_span!(
            "agent",
            agent.name = %agent.name,
            agent.model = %agent.model,
            gen_ai.system = "folio",
            agent.max_steps = agent.max_steps,
            agent.tools = tracing::field::Empty,
            agent.result_steps = tracing::field::Empty,
            error = tracing::field::Empty,
        );
        Box::pin(Self::run_inner(agent, input, config).instrument(span))
    }

    async fn run_inner(agent: &Agent, input: UserInput, config: RunConfig) -> Result<RunResult> {
        let mut state = RunState::init(agent, input, &config).await?;

        for step in 1..=state.max_steps {
            debug!(agent = %agent.name, step, "Starting step");

            let request = state.build_request();
            let response = state.provider.chat(&request).await.map_err(|e| {
                error!(error = %e, agent = %agent.name, step, "LLM call failed");
                tracing::Span::current().record("error", tracing::field::display(&e));
                e
            })?;

            if let Some(usage) = response.usage {
                state.usage += usage;
            }

            match Self::classify_response(&response) {
                NextStep::FinalOutput { output } => {
                    state.messages.push(response.message.clone());
                    state.step_history.push(StepInfo {
                        step,
                        response: response.clone(),
                        tool_calls: Vec::new(),
                    });

                    if let Some(session) = &config.session {
                        let to_save = [state.user_message.clone(), response.message];
                        if let Err(e) = session.add_messages(&to_save).await {
                            warn!(error = %e, session = session.id(), "Failed to save history");
                        }
                    }

                    tracing::Span::current().record("agent.result_steps", step);
                    info!(
                        agent = %agent.name,
                        steps = step,
                        input_tokens = state.usage.input_tokens,
                        output_tokens = state.usage.output_tokens,
                        "Agent run completed",
                    );

                    return Ok(RunResult {
                        output,
                        usage: state.usage,
                        steps: step,
                        step_history: state.step_history,
                        agent_name: agent.name.clone(),
                    });
                }
                NextStep::ToolCalls { calls } => {
                    state.messages.push(response.message.clone());
                    let records = Self::execute_tool_calls(
                        &calls,
                        agent,
                        &state.context,
                        &mut state.messages,
                        config.max_tool_concurrency,
                    )
                    .await;
                    state.step_history.push(StepInfo {
                        step,
                        response,
                        tool_calls: records,
                    });
                }
            }
        }

        let err = Error::max_steps(state.max_steps);
        error!(error = %err, agent = %agent.name, max_steps = state.max_steps, "Max steps exceeded");
        tracing::Span::current().record("error", tracing::field::display(&err));
        Err(err)
    }

    fn collect_all_definitions(agent: &Agent) -> Vec<ToolDefinition> {
        agent
            .tools
            .iter()
            .map(|t| t.definition())
            .chain(agent.managed_agents.iter().map(Agent::tool_definition))
            .collect()
    }

    fn classify_response(response: &ChatResponse) -> NextStep {
        match response.tool_calls() {
            Some(calls) if !calls.is_empty() => NextStep::ToolCalls {
                calls: calls.to_vec(),
            },
            _ => NextStep::FinalOutput {
                output: response.text().unwrap_or_default(),
            },
        }
    }

    /// Execute tool calls concurrently and append results to messages.
    ///
    /// Runs up to `max_concurrency` calls at once per chunk using
    /// [`futures::future::join_all`]. Results are appended in call order.
    async fn execute_tool_calls(
        calls: &[ToolCall],
        agent: &Agent,
        context: &ToolContext,
        messages: &mut Vec<Message>,
        max_concurrency: Option<usize>,
    ) -> Vec<ToolCallRecord> {
        let concurrency = max_concurrency.unwrap_or(calls.len()).max(1);
        let mut records = Vec::with_capacity(calls.len());

        for chunk in calls.chunks(concurrency) {
            let futs = chunk
                .iter()
                .map(|call| Self::execute_single_tool(call, agent, context));
            records.extend(futures::future::join_all(futs).await);
        }

        for record in &records {
            messages.push(Message::tool(&record.id, &record.name, &record.result));
        }

        records
    }

    async fn execute_single_tool(
        call: &ToolCall,
        agent: &Agent,
        context: &ToolContext,
    ) -> ToolCallRecord {
        let tool_span = info_span!(
            "tool",
            tool.name = %call.name,
            tool.id = %call.id,
            tool.input = %call.arguments,
            tool.output = tracing::field::Empty,
            tool.success = tracing::field::Empty,
            error = tracing::field::Empty,
        );

        async {
            let (result, success) =
                if let Some(sub) = agent.managed_agents.iter().find(|a| a.name == call.name) {
                    Self::dispatch_managed_agent(sub, &call.arguments, context).await
                } else if let Some(tool) = agent.tools.iter().find(|t| t.name() == call.name) {
                    Self::dispatch_tool(tool, call, context).await
                } else {
                    warn!(tool = %call.name, "Tool not found");
                    let result = ToolCallResult::failure(
                        &call.id,
                        &call.name,
                        ToolError::not_found(&call.name),
                    );
                    (result.to_observation(), false)
                };

            let current = tracing::Span::current();
            current.record("tool.success", success);
            current.record("tool.output", result.as_str());
            if !success {
                current.record("error", result.as_str());
            }

            ToolCallRecord {
                id: call.id.clone(),
                name: call.name.clone(),
                arguments: call.arguments.clone(),
                result,
                success,
            }
        }
        .instrument(tool_span)
        .await
    }

    async fn dispatch_managed_agent(
        sub_agent: &Agent,
        args: &Value,
        context: &ToolContext,
    ) -> (String, bool) {
        let task = match args {
            Value::String(s) => serde_json::from_str::<Value>(s)
                .ok()
                .and_then(|v| v.get("task").and_then(Value::as_str).map(str::to_owned))
                .unwrap_or_else(|| s.clone()),
            other => other
                .get("task")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
        };
        info!(
            from_agent = context.agent_name().unwrap_or_default(),
            to_agent = %sub_agent.name,
            "Handoff to managed agent",
        );
        let config = RunConfig::new().context(context.clone());
        match Self::run(sub_agent, task, config).await {
            Ok(result) => (result.output, true),
            Err(e) => (
                format!("Managed agent '{}' failed: {e}", sub_agent.name),
                false,
            ),
        }
    }

    async fn dispatch_tool(
        tool: &BoxedTool,
        call: &ToolCall,
        context: &ToolContext,
    ) -> (String, bool) {
        let result = match tool.call_json(context, call.arguments.clone()).await {
            Ok(value) => ToolCallResult::success(&call.id, &call.name, value),
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                ToolCallResult::failure(&call.id, &call.name, e)
            }
        };
        (result.to_observation(), result.is_success())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::artifact::Artifact;
    use crate::error::LlmError;
    use crate::llms::MockChatProvider;
    use crate::memory::{InMemorySession, Session};
    use crate::message::Role;
    use crate::tool::Tool;

    /// Counts artifacts visible through the context.
    struct CountArtifacts;

    #[derive(Deserialize)]
    struct NoArgs {}

    #[async_trait]
    impl Tool for CountArtifacts {
        const NAME: &'static str = "count_artifacts";
        type Args = NoArgs;
        type Output = usize;
        type Error = ToolError;

        fn description(&self) -> String {
            "Counts stored artifacts.".into()
        }

        async fn call(
            &self,
            ctx: &ToolContext,
            _args: NoArgs,
        ) -> std::result::Result<usize, ToolError> {
            Ok(ctx.list_artifacts().await?.len())
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl Tool for AlwaysFails {
        const NAME: &'static str = "always_fails";
        type Args = NoArgs;
        type Output = String;
        type Error = ToolError;

        fn description(&self) -> String {
            "Fails.".into()
        }

        async fn call(
            &self,
            _ctx: &ToolContext,
            _args: NoArgs,
        ) -> std::result::Result<String, ToolError> {
            Err(ToolError::execution("disk on fire"))
        }
    }

    fn agent_with(mock: &Arc<MockChatProvider>) -> Agent {
        Agent::new("root")
            .instructions("be helpful")
            .model("test-model")
            .provider(Arc::clone(mock) as _)
    }

    mod final_output {
        use super::*;

        #[tokio::test]
        async fn text_response_finishes_run() {
            let mock = Arc::new(MockChatProvider::new().push_text("hello"));
            let result = agent_with(&mock).run("hi", RunConfig::default()).await.unwrap();

            assert_eq!(result.output, "hello");
            assert_eq!(result.steps, 1);
            assert_eq!(result.agent_name, "root");

            let request = mock.last_request().unwrap();
            assert_eq!(request.model, "test-model");
            assert_eq!(request.messages[0].role, Role::System);
            assert_eq!(request.messages[1].text().as_deref(), Some("hi"));
            assert!(request.tools.is_none());
        }

        #[tokio::test]
        async fn missing_provider_is_agent_error() {
            let err = Agent::new("lonely")
                .run("hi", RunConfig::default())
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Agent(_)));
        }

        #[tokio::test]
        async fn provider_error_propagates() {
            let mock =
                Arc::new(MockChatProvider::new().push_error(LlmError::auth("mock", "bad key")));
            let err = agent_with(&mock).run("hi", RunConfig::default()).await.unwrap_err();
            assert!(matches!(err, Error::Llm(_)));
        }

        #[tokio::test]
        async fn max_steps_exceeded() {
            let mock = Arc::new(
                MockChatProvider::new()
                    .push_tool_call("count_artifacts", json!({}))
                    .push_tool_call("count_artifacts", json!({})),
            );
            let agent = agent_with(&mock).tool(Box::new(CountArtifacts)).max_steps(2);
            let err = agent.run("loop", RunConfig::default()).await.unwrap_err();
            assert!(matches!(err, Error::MaxSteps { max_steps: 2 }));
        }

        #[tokio::test]
        async fn run_config_overrides_max_steps() {
            let mock = Arc::new(MockChatProvider::new().push_tool_call("count_artifacts", json!({})));
            let agent = agent_with(&mock).tool(Box::new(CountArtifacts));
            let err = agent
                .run("loop", RunConfig::new().max_steps(1))
                .await
                .unwrap_err();
            assert!(matches!(err, Error::MaxSteps { max_steps: 1 }));
        }
    }

    mod tools {
        use super::*;

        #[tokio::test]
        async fn tool_result_is_fed_back() {
            let mock = Arc::new(
                MockChatProvider::new()
                    .push_tool_call("count_artifacts", json!({}))
                    .push_text("you have one file"),
            );
            let context = ToolContext::detached();
            context
                .save_artifact("a.pdf", Artifact::new("application/pdf", vec![1]))
                .await
                .unwrap();

            let agent = agent_with(&mock).tool(Box::new(CountArtifacts));
            let result = agent
                .run("how many?", RunConfig::new().context(context))
                .await
                .unwrap();

            assert_eq!(result.output, "you have one file");
            assert_eq!(result.steps, 2);
            let record = result.tool_calls().next().unwrap();
            assert!(record.success);
            assert_eq!(record.result, "1");

            let second = &mock.requests()[1];
            let tool_msg = second.messages.last().unwrap();
            assert_eq!(tool_msg.role, Role::Tool);
            assert_eq!(tool_msg.name.as_deref(), Some("count_artifacts"));
            assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_0"));
            assert_eq!(second.tools.as_ref().unwrap().len(), 1);
        }

        #[tokio::test]
        async fn unknown_tool_is_an_observation() {
            let mock = Arc::new(
                MockChatProvider::new()
                    .push_tool_call("nonexistent", json!({}))
                    .push_text("sorry"),
            );
            let result = agent_with(&mock).run("x", RunConfig::default()).await.unwrap();
            let record = result.tool_calls().next().unwrap();
            assert!(!record.success);
            assert_eq!(record.result, "Tool error: Tool not found: nonexistent");
            assert_eq!(result.output, "sorry");
        }

        #[tokio::test]
        async fn tool_failure_is_an_observation() {
            let mock = Arc::new(
                MockChatProvider::new()
                    .push_tool_call("always_fails", json!({}))
                    .push_text("it failed"),
            );
            let agent = agent_with(&mock).tool(Box::new(AlwaysFails));
            let result = agent.run("x", RunConfig::default()).await.unwrap();
            let record = result.tool_calls().next().unwrap();
            assert!(!record.success);
            assert!(record.result.starts_with("Tool error: "));
            assert!(record.result.contains("disk on fire"));
        }

        #[tokio::test]
        async fn parallel_calls_keep_order() {
            let mock = Arc::new(
                MockChatProvider::new()
                    .push_tool_calls(vec![
                        ToolCall::new("a", "count_artifacts", json!({})),
                        ToolCall::new("b", "always_fails", json!({})),
                        ToolCall::new("c", "count_artifacts", json!({})),
                    ])
                    .push_text("ok"),
            );
            let agent = agent_with(&mock)
                .tool(Box::new(CountArtifacts))
                .tool(Box::new(AlwaysFails));
            let result = agent
                .run("x", RunConfig::new().max_tool_concurrency(2))
                .await
                .unwrap();

            let ids: Vec<_> = result.tool_calls().map(|r| r.id.as_str()).collect();
            assert_eq!(ids, vec!["a", "b", "c"]);

            let messages = &mock.requests()[1].messages;
            let tool_ids: Vec<_> = messages
                .iter()
                .filter(|m| m.role == Role::Tool)
                .filter_map(|m| m.tool_call_id.as_deref())
                .collect();
            assert_eq!(tool_ids, vec!["a", "b", "c"]);
        }
    }

    mod managed_agents {
        use super::*;

        #[tokio::test]
        async fn sub_agent_shares_context() {
            let sub_mock = Arc::new(
                MockChatProvider::new()
                    .push_tool_call("count_artifacts", json!({}))
                    .push_text("2 files"),
            );
            let root_mock = Arc::new(
                MockChatProvider::new()
                    .push_tool_call("counter", json!({"task": "count files"}))
                    .push_text("There are 2 files."),
            );

            let counter = Agent::new("counter")
                .description("Counts files")
                .provider(Arc::clone(&sub_mock) as _)
                .tool(Box::new(CountArtifacts));
            let root = agent_with(&root_mock).managed_agent(counter);

            let context = ToolContext::detached();
            for name in ["a", "b"] {
                context
                    .save_artifact(name, Artifact::new("text/plain", vec![0]))
                    .await
                    .unwrap();
            }

            let result = root.run("count", RunConfig::new().context(context)).await.unwrap();
            assert_eq!(result.output, "There are 2 files.");

            let sub_task = &sub_mock.requests()[0].messages[0];
            assert_eq!(sub_task.text().as_deref(), Some("count files"));
            assert_eq!(sub_mock.requests()[1].messages.last().unwrap().text().as_deref(), Some("2"));

            let record = result.tool_calls().next().unwrap();
            assert_eq!(record.result, "2 files");
            assert!(record.success);
        }

        #[tokio::test]
        async fn sub_agent_failure_is_reported() {
            let sub_mock = Arc::new(MockChatProvider::new());
            let root_mock = Arc::new(
                MockChatProvider::new()
                    .push_tool_call("helper", json!({"task": "x"}))
                    .push_text("helper broke"),
            );
            let helper = Agent::new("helper").provider(Arc::clone(&sub_mock) as _);
            let root = agent_with(&root_mock).managed_agent(helper);

            let result = root.run("x", RunConfig::default()).await.unwrap();
            let record = result.tool_calls().next().unwrap();
            assert!(!record.success);
            assert!(record.result.starts_with("Managed agent 'helper' failed: "));
        }
    }

    mod session {
        use super::*;

        #[tokio::test]
        async fn history_is_loaded_and_saved() {
            let session: Arc<InMemorySession> = Arc::new(InMemorySession::with_messages(
                "s",
                vec![Message::user("earlier"), Message::assistant("noted")],
            ));
            let mock = Arc::new(MockChatProvider::new().push_text("second answer"));

            agent_with(&mock)
                .run("now", RunConfig::new().session(Arc::clone(&session) as _))
                .await
                .unwrap();

            let sent = &mock.last_request().unwrap().messages;
            let texts: Vec<_> = sent.iter().filter_map(Message::text).collect();
            assert_eq!(texts, vec!["be helpful", "earlier", "noted", "now"]);

            let stored = session.get_messages(None).await.unwrap();
            assert_eq!(stored.len(), 4);
            assert_eq!(stored[3].text().as_deref(), Some("second answer"));
        }
    }
}
