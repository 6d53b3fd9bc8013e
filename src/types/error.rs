//! Unified Error Type System
//!
//! Single error type for the whole crate. Collaborator failures (git, the
//! completion endpoint, the config store) are wrapped with the operation
//! being attempted and surfaced to the dispatcher as one line.
//!
//! ## Error Categories
//!
//! - **Environment**: not a repository, missing credential, no editor
//! - **Subprocess**: git exited nonzero outside a known empty-result convention
//! - **Transport**: non-success status, malformed envelope, empty choices
//! - **Cancelled**: the user interrupted an interactive flow

use thiserror::Error;

/// Error categories used by the dispatcher to pick an exit path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Environment,
    Subprocess,
    Transport,
    Usage,
    Cancelled,
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Environment => write!(f, "ENVIRONMENT"),
            Self::Subprocess => write!(f, "SUBPROCESS"),
            Self::Transport => write!(f, "TRANSPORT"),
            Self::Usage => write!(f, "USAGE"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SgitError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // -------------------------------------------------------------------------
    // Environment Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Not a git repository (or any of the parent directories)")]
    NotARepository,

    #[error("API key not configured: run 'sgit config' or set UPSTAGE_API_KEY")]
    MissingCredential,

    #[error("Editor error: {0}")]
    Editor(String),

    // -------------------------------------------------------------------------
    // Collaborator Errors
    // -------------------------------------------------------------------------
    /// Git exited nonzero for a reason other than an expected empty result
    #[error("git {operation} failed (exit {code}): {stderr}")]
    Git {
        operation: String,
        code: i32,
        stderr: String,
    },

    /// Non-success status from the completion endpoint
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("LLM API error: {0}")]
    LlmApi(String),

    // -------------------------------------------------------------------------
    // Invocation Errors
    // -------------------------------------------------------------------------
    #[error("{0}")]
    Usage(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<SgitError>,
    },
}

impl SgitError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) | Self::NotARepository | Self::MissingCredential | Self::Editor(_) => {
                ErrorCategory::Environment
            }
            Self::Git { .. } => ErrorCategory::Subprocess,
            Self::Api { .. } | Self::LlmApi(_) | Self::Http(_) => ErrorCategory::Transport,
            Self::Usage(_) => ErrorCategory::Usage,
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::Io(e) if e.kind() == std::io::ErrorKind::Interrupted => ErrorCategory::Cancelled,
            Self::Io(_) | Self::Json(_) => ErrorCategory::Internal,
            Self::Context { source, .. } => source.category(),
        }
    }

    /// True when the user aborted an interactive flow
    pub fn is_cancelled(&self) -> bool {
        self.category() == ErrorCategory::Cancelled
    }

    pub fn git(operation: impl Into<String>, code: i32, stderr: impl Into<String>) -> Self {
        let stderr = stderr.into().trim().to_string();
        Self::Git {
            operation: operation.into(),
            code,
            // interactive runs already showed git's own message
            stderr: if stderr.is_empty() {
                "see git output above".to_string()
            } else {
                stderr
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, SgitError>;

/// Error context extension trait
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> Result<T>;

    /// Add context using a closure (lazy evaluation)
    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<SgitError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|e| SgitError::Context {
            context: context.into(),
            source: Box::new(e.into()),
        })
    }

    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| SgitError::Context {
            context: f().into(),
            source: Box::new(e.into()),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Transport.to_string(), "TRANSPORT");
        assert_eq!(ErrorCategory::Cancelled.to_string(), "CANCELLED");
    }

    #[test]
    fn test_api_error_carries_status_and_body() {
        let err = SgitError::Api {
            status: 401,
            body: "{\"error\":\"bad key\"}".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("bad key"));
        assert_eq!(err.category(), ErrorCategory::Transport);
    }

    #[test]
    fn test_git_error_trims_stderr() {
        let err = SgitError::git("commit", 128, "fatal: oops\n");
        assert_eq!(err.to_string(), "git commit failed (exit 128): fatal: oops");
        assert_eq!(err.category(), ErrorCategory::Subprocess);
    }

    #[test]
    fn test_context_keeps_inner_category() {
        let res: std::result::Result<(), SgitError> = Err(SgitError::Cancelled);
        let err = res.with_context("reading API key").unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(err.to_string(), "reading API key: Operation cancelled");
    }

    #[test]
    fn test_interrupted_io_is_cancellation() {
        let err: SgitError = std::io::Error::from(std::io::ErrorKind::Interrupted).into();
        assert!(err.is_cancelled());
    }
}
