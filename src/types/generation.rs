//! Generation request configuration and results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, ErrorContext};

pub const DEFAULT_TEMPERATURE: f64 = 0.6;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2000;

/// Closed set of generation backends.
///
/// Declaration order is the fallback order used after the configured primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendId {
    Yandex,
    OpenRouter,
}

impl BackendId {
    pub const ALL: [BackendId; 2] = [BackendId::Yandex, BackendId::OpenRouter];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendId::Yandex => "yandex",
            BackendId::OpenRouter => "openrouter",
        }
    }

    /// `primary` first, then every other backend in declaration order.
    pub fn fallback_order(primary: BackendId) -> Vec<BackendId> {
        std::iter::once(primary)
            .chain(Self::ALL.into_iter().filter(|b| *b != primary))
            .collect()
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yandex" | "yandexgpt" => Ok(BackendId::Yandex),
            "openrouter" => Ok(BackendId::OpenRouter),
            other => Err(Error::configuration_with_context(
                format!("unknown backend '{}'", other),
                ErrorContext::new()
                    .with_field_path("backend")
                    .with_details("expected one of: yandex, openrouter"),
            )),
        }
    }
}

/// Per-call generation parameters. Absent fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub backend: BackendId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_max_output_tokens() -> u32 {
    DEFAULT_MAX_OUTPUT_TOKENS
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: BackendId::Yandex,
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

impl GenerationConfig {
    pub fn new(backend: BackendId) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Same parameters addressed to another backend.
    ///
    /// The model is only kept when targeting the configured backend, since
    /// model identifiers are backend-specific.
    pub fn for_backend(&self, backend: BackendId) -> Self {
        Self {
            backend,
            model: if backend == self.backend {
                self.model.clone()
            } else {
                None
            },
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        }
    }
}

/// Successful completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub content: String,
    pub backend: BackendId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}
