use crate::types::BackendId;
use thiserror::Error;

/// Structured error context for configuration and input failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or setting that caused the error (e.g., "credentials.yandex_folder_id")
    pub field_path: Option<String>,
    /// Additional context about the error
    pub details: Option<String>,
    /// Component that raised the error (e.g., "yandex_driver", "document_pipeline")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Unified error type for the generation pipeline.
///
/// Backend clients raise `Configuration`, `Network`, `Backend` and
/// `EmptyResponse`; the orchestrator wraps the last of those into
/// `AllBackendsExhausted`; the document pipeline raises `Input` before any
/// network call is made.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Network(#[from] TransportError),

    #[error("Backend error: {backend} returned HTTP {status}: {message}")]
    Backend {
        backend: BackendId,
        status: u16,
        message: String,
    },

    #[error("Empty response: {backend} returned no generated text")]
    EmptyResponse { backend: BackendId },

    #[error("All backends exhausted after {attempts} attempts; last error: {last_error}")]
    AllBackendsExhausted {
        attempts: u32,
        last_error: Box<Error>,
    },

    #[error("Input error: {message}{}", format_context(.context))]
    Input {
        message: String,
        context: ErrorContext,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::configuration_with_context(msg, ErrorContext::new())
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self::input_with_context(msg, ErrorContext::new())
    }

    pub fn input_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Input {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Input { context, .. } => Some(context),
            _ => None,
        }
    }

    /// The innermost backend-level error: unwraps `AllBackendsExhausted`.
    pub fn root(&self) -> &Error {
        match self {
            Error::AllBackendsExhausted { last_error, .. } => last_error.root(),
            other => other,
        }
    }

    /// HTTP status reported by a backend, if the root error carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self.root() {
            Error::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Transport-level failures: the request never produced an HTTP response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else {
            TransportError::Http(e)
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network(e.into())
    }
}
