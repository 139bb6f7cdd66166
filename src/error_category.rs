//! Human-facing error categories.
//!
//! The pipeline reports precise [`Error`] variants; callers that render errors
//! for people collapse them into a small set of categories.
//!
//! | Code | Category      | Typical cause                                   |
//! |------|---------------|-------------------------------------------------|
//! | E1   | timeout       | backend did not answer in time                  |
//! | E2   | network       | connection refused, DNS, TLS                    |
//! | E3   | not_found     | HTTP 404 from a backend                         |
//! | E4   | server_error  | HTTP 5xx from a backend                         |
//! | E5   | configuration | missing or invalid credentials/settings         |
//! | E6   | quota         | HTTP 402/429, exhausted balance or quota        |
//! | E9   | unknown       | anything else                                   |
//!
//! ```rust
//! use article_digest::{Error, ErrorCategory};
//!
//! let err = Error::configuration("OPENROUTER_API_KEY is not set");
//! assert_eq!(err.category(), ErrorCategory::Configuration);
//! assert_eq!(err.category().code(), "E5");
//! ```

use std::fmt;

use crate::error::{Error, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Timeout,
    Network,
    NotFound,
    ServerError,
    Configuration,
    Quota,
    Unknown,
}

impl ErrorCategory {
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Timeout => "E1",
            Self::Network => "E2",
            Self::NotFound => "E3",
            Self::ServerError => "E4",
            Self::Configuration => "E5",
            Self::Quota => "E6",
            Self::Unknown => "E9",
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::NotFound => "not_found",
            Self::ServerError => "server_error",
            Self::Configuration => "configuration",
            Self::Quota => "quota",
            Self::Unknown => "unknown",
        }
    }

    /// Short sentence suitable for showing to an end user.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Timeout => "The generation service took too long to respond. Please try again.",
            Self::Network => "Could not reach the generation service. Check your connection.",
            Self::NotFound => "The requested model or endpoint was not found.",
            Self::ServerError => "The generation service reported an internal error. Try again later.",
            Self::Configuration => "The service is not configured: API credentials are missing or invalid.",
            Self::Quota => "The generation quota or account balance is exhausted.",
            Self::Unknown => "An unexpected error occurred while generating the result.",
        }
    }

    fn from_status(status: u16, message: &str) -> Self {
        match status {
            401 | 403 => Self::Configuration,
            402 | 429 => Self::Quota,
            404 => Self::NotFound,
            408 | 504 => Self::Timeout,
            500..=599 => Self::ServerError,
            _ if mentions_quota(message) => Self::Quota,
            _ => Self::Unknown,
        }
    }
}

fn mentions_quota(message: &str) -> bool {
    let m = message.to_lowercase();
    ["quota", "balance", "billing", "insufficient", "limit exceeded"]
        .iter()
        .any(|needle| m.contains(needle))
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Error {
    /// Classify this error for presentation. Exhaustion errors are classified
    /// by the last backend error they wrap.
    pub fn category(&self) -> ErrorCategory {
        match self.root() {
            Error::Configuration { .. } | Error::Settings(_) => ErrorCategory::Configuration,
            Error::Network(TransportError::Timeout(_)) => ErrorCategory::Timeout,
            Error::Network(_) => ErrorCategory::Network,
            Error::Backend {
                status, message, ..
            } => ErrorCategory::from_status(*status, message),
            Error::EmptyResponse { .. } => ErrorCategory::ServerError,
            _ => ErrorCategory::Unknown,
        }
    }
}
