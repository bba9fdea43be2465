//! Gemini `ChatProvider` implementation.

use async_trait::async_trait;
use tracing::debug;

use crate::chat::{ChatProvider, ChatRequest, ChatResponse, StopReason};
use crate::error::{LlmError, Result};
use crate::message::{Content, Message, Role, ToolCall};
use crate::usage::Usage;

use super::client::Gemini;
use super::types::GenerateContentResponse;

impl Gemini {
    /// Parse the response into a `ChatResponse`.
    pub(crate) fn parse_response(response: GenerateContentResponse) -> Result<ChatResponse> {
        let Some(candidate) = response.candidates.into_iter().next() else {
            if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
                return Err(LlmError::provider("gemini", format!("Prompt blocked: {reason}")).into());
            }
            return Err(LlmError::response_format("at least one candidate", "no candidates").into());
        };

        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if part.thought == Some(true) {
                continue;
            }
            if let Some(t) = part.text {
                text.push_str(&t);
            }
            if let Some(call) = part.function_call {
                let id = call
                    .id
                    .unwrap_or_else(|| format!("call_{}", tool_calls.len()));
                tool_calls.push(ToolCall::new(id, call.name, call.args));
            }
        }

        let stop_reason = if tool_calls.is_empty() {
            match candidate.finish_reason.as_deref() {
                None | Some("STOP") => StopReason::Stop,
                Some("MAX_TOKENS") => StopReason::Length,
                Some("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII") => {
                    StopReason::ContentFilter
                }
                Some(_) => StopReason::Other,
            }
        } else {
            StopReason::ToolCalls
        };

        let message = Message {
            role: Role::Assistant,
            content: (!text.is_empty()).then_some(Content::Text(text)),
            tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
            tool_call_id: None,
            name: None,
        };

        let usage = response.usage_metadata.map(|u| Usage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
            total_tokens: if u.total_token_count == 0 {
                u.prompt_token_count
                    .saturating_add(u.candidates_token_count)
            } else {
                u.total_token_count
            },
        });

        Ok(ChatResponse {
            message,
            stop_reason,
            usage,
            model: response.model_version,
        })
    }
}

#[async_trait]
impl ChatProvider for Gemini {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = self.generate_url(self.request_model(request));
        let body = Self::build_body(request);
        debug!(model = self.request_model(request), turns = body.contents.len(), "Gemini request");

        let response = self
            .build_request(&url)
            .json(&body)
            .send()
            .await
            .map_err(LlmError::from)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status.as_u16(), &error_text).into());
        }

        let response_text = response.text().await.map_err(LlmError::from)?;
        let parsed: GenerateContentResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                LlmError::response_format(
                    "valid Gemini response",
                    format!("parse error: {e}, response: {response_text}"),
                )
            })?;

        Self::parse_response(parsed)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn default_model(&self) -> &str {
        self.model()
    }

    fn supports_inline_data(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::{Error, LlmErrorKind};

    fn parse(value: serde_json::Value) -> Result<ChatResponse> {
        Gemini::parse_response(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn text_parts_are_concatenated() {
        let resp = parse(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Attention Is "}, {"text": "All You Need\n"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 1200, "candidatesTokenCount": 8, "totalTokenCount": 1250},
            "modelVersion": "gemini-2.5-flash"
        }))
        .unwrap();

        assert_eq!(resp.text().as_deref(), Some("Attention Is All You Need\n"));
        assert_eq!(resp.stop_reason, StopReason::Stop);
        assert_eq!(
            resp.usage,
            Some(Usage {
                input_tokens: 1200,
                output_tokens: 8,
                total_tokens: 1250
            })
        );
        assert_eq!(resp.model.as_deref(), Some("gemini-2.5-flash"));
    }

    #[test]
    fn thoughts_are_skipped() {
        let resp = parse(json!({
            "candidates": [{"content": {"parts": [
                {"text": "thinking...", "thought": true},
                {"text": "Answer"}
            ]}}]
        }))
        .unwrap();
        assert_eq!(resp.text().as_deref(), Some("Answer"));
    }

    #[test]
    fn function_calls_get_generated_ids() {
        let resp = parse(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"functionCall": {"name": "load_artifacts", "args": {}}},
                    {"functionCall": {"id": "abc", "name": "title_extractor", "args": {"task": "x"}}}
                ]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        let calls = resp.tool_calls().unwrap();
        assert_eq!(calls[0].id, "call_0");
        assert_eq!(calls[1].id, "abc");
        assert_eq!(calls[1].arguments["task"], "x");
        assert_eq!(resp.stop_reason, StopReason::ToolCalls);
        assert!(resp.text().is_none());
    }

    #[test]
    fn finish_reasons() {
        let reason = |r: &str| {
            parse(json!({"candidates": [{"content": {"parts": [{"text": "x"}]}, "finishReason": r}]}))
                .unwrap()
                .stop_reason
        };
        assert_eq!(reason("MAX_TOKENS"), StopReason::Length);
        assert_eq!(reason("SAFETY"), StopReason::ContentFilter);
        assert_eq!(reason("MALFORMED_FUNCTION_CALL"), StopReason::Other);
    }

    #[test]
    fn blocked_prompt_is_provider_error() {
        let err = parse(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap_err();
        match err {
            Error::Llm(e) => {
                assert_eq!(e.kind, LlmErrorKind::Provider);
                assert!(e.message.contains("SAFETY"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn no_candidates_is_format_error() {
        let err = parse(json!({})).unwrap_err();
        assert!(matches!(err, Error::Llm(ref e) if e.kind == LlmErrorKind::ResponseFormat));
    }

    #[test]
    fn missing_total_is_summed() {
        let resp = parse(json!({
            "candidates": [{"content": {"parts": [{"text": "x"}]}}],
            "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 4}
        }))
        .unwrap();
        assert_eq!(resp.usage.unwrap().total_tokens, 7);
    }
}
