//! Gemini client configuration.

use crate::error::{LlmError, Result};

/// Vertex AI project and location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexTarget {
    /// Google Cloud project id.
    pub project: String,
    /// Region, or `global`.
    pub location: String,
}

/// Configuration for the Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for the Developer API, or an OAuth access token for Vertex AI.
    pub api_key: String,
    /// Base URL override. Derived from the target when unset.
    pub base_url: Option<String>,
    /// Default model to use.
    pub model: String,
    /// Vertex AI target; `None` uses the Developer API.
    pub vertex: Option<VertexTarget>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl GeminiConfig {
    /// Default Developer API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";
    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash";
    /// Default Vertex AI location.
    pub const DEFAULT_LOCATION: &'static str = "us-central1";

    /// Creates a Developer API configuration with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Creates a Vertex AI configuration.
    #[must_use]
    pub fn vertex(
        project: impl Into<String>,
        location: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            api_key: access_token.into(),
            vertex: Some(VertexTarget {
                project: project.into(),
                location: location.into(),
            }),
            ..Self::default()
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Reads from:
    /// - `GOOGLE_GENAI_USE_VERTEXAI` - `true`/`1` selects Vertex AI
    /// - `GOOGLE_CLOUD_PROJECT` - Vertex project (required for Vertex)
    /// - `GOOGLE_CLOUD_LOCATION` - Vertex location (default `us-central1`)
    /// - `GOOGLE_ACCESS_TOKEN` - Vertex access token (required for Vertex)
    /// - `GEMINI_API_KEY`, then `GOOGLE_API_KEY` - Developer API key
    /// - `GEMINI_BASE_URL` - Optional base URL
    /// - `GEMINI_MODEL` - Optional default model
    ///
    /// # Errors
    ///
    /// Returns an auth error when the required credential is missing.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let use_vertex = var("GOOGLE_GENAI_USE_VERTEXAI")
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"));

        let mut config = if use_vertex {
            let project = var("GOOGLE_CLOUD_PROJECT").ok_or_else(|| {
                LlmError::auth("gemini", "GOOGLE_CLOUD_PROJECT environment variable not set")
            })?;
            let location =
                var("GOOGLE_CLOUD_LOCATION").unwrap_or_else(|| Self::DEFAULT_LOCATION.to_owned());
            let token = var("GOOGLE_ACCESS_TOKEN").ok_or_else(|| {
                LlmError::auth("gemini", "GOOGLE_ACCESS_TOKEN environment variable not set")
            })?;
            Self::vertex(project, location, token)
        } else {
            let key = var("GEMINI_API_KEY")
                .or_else(|| var("GOOGLE_API_KEY"))
                .ok_or_else(|| {
                    LlmError::auth(
                        "gemini",
                        "GEMINI_API_KEY or GOOGLE_API_KEY environment variable not set",
                    )
                })?;
            Self::new(key)
        };

        config.base_url = var("GEMINI_BASE_URL");
        if let Some(model) = var("GEMINI_MODEL") {
            config.model = model;
        }
        Ok(config)
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the default model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Returns `true` when targeting Vertex AI.
    #[must_use]
    pub const fn is_vertex(&self) -> bool {
        self.vertex.is_some()
    }

    /// The base URL requests are sent to, without a trailing slash.
    #[must_use]
    pub fn resolved_base_url(&self) -> String {
        if let Some(url) = &self.base_url {
            return url.trim_end_matches('/').to_owned();
        }
        match &self.vertex {
            Some(target) if target.location == "global" => {
                "https://aiplatform.googleapis.com/v1".to_owned()
            }
            Some(target) => format!("https://{}-aiplatform.googleapis.com/v1", target.location),
            None => Self::DEFAULT_BASE_URL.to_owned(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            model: Self::DEFAULT_MODEL.to_owned(),
            vertex: None,
            timeout_secs: Some(120),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    mod builder {
        use super::*;

        #[test]
        fn new_uses_defaults() {
            let config = GeminiConfig::new("key");
            assert_eq!(config.api_key, "key");
            assert_eq!(config.model, "gemini-2.5-flash");
            assert_eq!(config.timeout_secs, Some(120));
            assert!(!config.is_vertex());
            assert_eq!(config.resolved_base_url(), GeminiConfig::DEFAULT_BASE_URL);
        }

        #[test]
        fn chain() {
            let config = GeminiConfig::new("k")
                .with_model("gemini-2.5-pro")
                .with_timeout(30)
                .with_base_url("http://localhost:8080/");
            assert_eq!(config.model, "gemini-2.5-pro");
            assert_eq!(config.timeout_secs, Some(30));
            assert_eq!(config.resolved_base_url(), "http://localhost:8080");
        }

        #[test]
        fn vertex_base_urls() {
            let regional = GeminiConfig::vertex("p", "europe-west4", "tok");
            assert_eq!(
                regional.resolved_base_url(),
                "https://europe-west4-aiplatform.googleapis.com/v1"
            );
            let global = GeminiConfig::vertex("p", "global", "tok");
            assert_eq!(
                global.resolved_base_url(),
                "https://aiplatform.googleapis.com/v1"
            );
        }
    }

    mod from_env {
        use super::*;

        #[test]
        fn developer_api_key() {
            let config = GeminiConfig::from_lookup(lookup(&[("GOOGLE_API_KEY", "g")])).unwrap();
            assert_eq!(config.api_key, "g");
            assert!(!config.is_vertex());
        }

        #[test]
        fn gemini_key_wins_over_google_key() {
            let config = GeminiConfig::from_lookup(lookup(&[
                ("GEMINI_API_KEY", "a"),
                ("GOOGLE_API_KEY", "b"),
                ("GEMINI_MODEL", "gemini-2.0-flash"),
            ]))
            .unwrap();
            assert_eq!(config.api_key, "a");
            assert_eq!(config.model, "gemini-2.0-flash");
        }

        #[test]
        fn missing_key_is_auth_error() {
            let err = GeminiConfig::from_lookup(lookup(&[])).unwrap_err();
            assert!(err.to_string().contains("GEMINI_API_KEY"));
        }

        #[test]
        fn vertex_from_env() {
            let config = GeminiConfig::from_lookup(lookup(&[
                ("GOOGLE_GENAI_USE_VERTEXAI", "TRUE"),
                ("GOOGLE_CLOUD_PROJECT", "proj"),
                ("GOOGLE_ACCESS_TOKEN", "tok"),
            ]))
            .unwrap();
            let target = config.vertex.clone().unwrap();
            assert_eq!(target.project, "proj");
            assert_eq!(target.location, "us-central1");
            assert_eq!(config.api_key, "tok");
        }

        #[test]
        fn vertex_without_project_fails() {
            let err = GeminiConfig::from_lookup(lookup(&[
                ("GOOGLE_GENAI_USE_VERTEXAI", "1"),
                ("GOOGLE_ACCESS_TOKEN", "tok"),
            ]))
            .unwrap_err();
            assert!(err.to_string().contains("GOOGLE_CLOUD_PROJECT"));
        }

        #[test]
        fn blank_values_are_ignored() {
            let config = GeminiConfig::from_lookup(lookup(&[
                ("GEMINI_API_KEY", "  "),
                ("GOOGLE_API_KEY", "b"),
                ("GEMINI_BASE_URL", ""),
            ]))
            .unwrap();
            assert_eq!(config.api_key, "b");
            assert!(config.base_url.is_none());
        }
    }
}
