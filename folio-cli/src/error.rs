//! Error type of the `folio` binary.

use crate::config::ConfigError;

/// Errors surfaced by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration could not be loaded, saved or resolved.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A file could not be read or the terminal could not be used.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The agent run failed.
    #[error("agent error: {0}")]
    Agent(#[from] folio::Error),

    /// Invalid command-line input.
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    /// Create a usage error.
    #[must_use]
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}

/// Result type for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_library_errors() {
        let err: CliError = folio::Error::agent("no provider").into();
        assert_eq!(err.to_string(), "agent error: Agent error: no provider");
    }

    #[test]
    fn usage_is_shown_verbatim() {
        assert_eq!(CliError::usage("missing path").to_string(), "missing path");
    }
}
