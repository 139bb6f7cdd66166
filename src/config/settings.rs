use serde::Deserialize;
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;
use url::Url;

use crate::types::{BackendId, GenerationConfig};
use crate::{Error, ErrorContext, Result};

/// One year.
pub const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;
/// One day.
pub const MAX_CACHE_SWEEP_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Pipeline tunables.
///
/// Every field has a default; a YAML file may override a subset and
/// `DIGEST_*` environment variables override both.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: BackendId,
    pub model: Option<String>,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub retries: u32,
    pub retry_base_delay_ms: u64,
    pub pacing_delay_ms: u64,
    pub max_chunk_chars: usize,
    pub cache_ttl_secs: u64,
    pub cache_sweep_interval_secs: u64,
    pub http_timeout_secs: u64,
    pub yandex_base_url: String,
    pub openrouter_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: BackendId::Yandex,
            model: None,
            temperature: crate::types::generation::DEFAULT_TEMPERATURE,
            max_output_tokens: crate::types::generation::DEFAULT_MAX_OUTPUT_TOKENS,
            retries: 2,
            retry_base_delay_ms: 1000,
            pacing_delay_ms: 500,
            max_chunk_chars: 8000,
            cache_ttl_secs: 3600,
            cache_sweep_interval_secs: 600,
            http_timeout_secs: 60,
            yandex_base_url: "https://llm.api.cloud.yandex.net".to_string(),
            openrouter_base_url: "https://openrouter.ai".to_string(),
        }
    }
}

impl Settings {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    /// Defaults (or the given file) with environment overrides applied.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        let settings = base.with_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_parse::<BackendId>("DIGEST_BACKEND") {
            self.backend = v;
        }
        if let Ok(v) = env::var("DIGEST_MODEL") {
            if !v.trim().is_empty() {
                self.model = Some(v);
            }
        }
        if let Some(v) = env_parse("DIGEST_TEMPERATURE") {
            self.temperature = v;
        }
        if let Some(v) = env_parse("DIGEST_MAX_OUTPUT_TOKENS") {
            self.max_output_tokens = v;
        }
        if let Some(v) = env_parse("DIGEST_RETRIES") {
            self.retries = v;
        }
        if let Some(v) = env_parse("DIGEST_RETRY_BASE_DELAY_MS") {
            self.retry_base_delay_ms = v;
        }
        if let Some(v) = env_parse("DIGEST_PACING_DELAY_MS") {
            self.pacing_delay_ms = v;
        }
        if let Some(v) = env_parse("DIGEST_MAX_CHUNK_CHARS") {
            self.max_chunk_chars = v;
        }
        if let Some(v) = env_parse("DIGEST_CACHE_TTL_SECS") {
            self.cache_ttl_secs = v;
        }
        if let Some(v) = env_parse("DIGEST_CACHE_SWEEP_SECS") {
            self.cache_sweep_interval_secs = v;
        }
        if let Some(v) = env_parse("DIGEST_HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = v;
        }
        if let Ok(v) = env::var("DIGEST_YANDEX_BASE_URL") {
            self.yandex_base_url = v;
        }
        if let Ok(v) = env::var("DIGEST_OPENROUTER_BASE_URL") {
            self.openrouter_base_url = v;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("yandex_base_url", &self.yandex_base_url),
            ("openrouter_base_url", &self.openrouter_base_url),
        ] {
            Url::parse(value).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid base URL '{}'", value),
                    ErrorContext::new()
                        .with_field_path(field)
                        .with_details(e.to_string())
                        .with_source("settings"),
                )
            })?;
        }
        if self.max_chunk_chars == 0 {
            return Err(Error::configuration_with_context(
                "max_chunk_chars must be positive",
                ErrorContext::new()
                    .with_field_path("max_chunk_chars")
                    .with_source("settings"),
            ));
        }
        if self.cache_sweep_interval_secs == 0
            || self.cache_sweep_interval_secs > MAX_CACHE_SWEEP_INTERVAL_SECS
        {
            return Err(Error::configuration_with_context(
                format!(
                    "cache_sweep_interval_secs must be between 1 and {}",
                    MAX_CACHE_SWEEP_INTERVAL_SECS
                ),
                ErrorContext::new()
                    .with_field_path("cache_sweep_interval_secs")
                    .with_source("settings"),
            ));
        }
        if self.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(Error::configuration_with_context(
                format!("cache_ttl_secs must be at most {}", MAX_CACHE_TTL_SECS),
                ErrorContext::new()
                    .with_field_path("cache_ttl_secs")
                    .with_source("settings"),
            ));
        }
        Ok(())
    }

    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            backend: self.backend,
            model: self.model.clone(),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        }
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(variable = key, value = raw.as_str(), "ignoring unparseable environment override");
            None
        }
    }
}
