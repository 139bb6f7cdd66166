//! Backend clients behind a single "complete a chat prompt" capability.
//!
//! Each remote service is a [`ProviderDriver`]: it knows how to turn a prompt
//! into an HTTP request and where the generated text lives in the reply.
//! [`HttpBackend`] runs any driver over the shared [`HttpTransport`] and
//! applies the common error contract, so variants differ only in wire
//! format and credential shape. [`BackendSet`] maps each [`BackendId`] to its
//! client; the orchestrator looks backends up there by id.

pub mod openrouter;
pub mod yandex;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{Credentials, Settings};
use crate::transport::HttpTransport;
use crate::types::{BackendId, GenerationConfig, GenerationResult, Message};
use crate::{Error, Result};

pub use openrouter::OpenRouterDriver;
pub use yandex::YandexDriver;

/// The one capability the orchestrator needs from a backend.
#[async_trait]
pub trait Backend: Send + Sync + std::fmt::Debug {
    fn id(&self) -> BackendId;

    /// Complete a chat-style prompt.
    ///
    /// Fails with `Configuration` when credentials are missing (before any
    /// network call), `Network` on transport failure, `Backend` on a non-2xx
    /// or malformed reply and `EmptyResponse` when no text can be extracted.
    async fn complete(&self, messages: &[Message], config: &GenerationConfig)
        -> Result<GenerationResult>;
}

/// Provider-specific HTTP request.
#[derive(Debug, Clone)]
pub struct DriverRequest {
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Value,
    /// Model actually requested, after defaults are applied.
    pub model: String,
}

/// Wire format of one backend.
pub trait ProviderDriver: Send + Sync + std::fmt::Debug {
    fn backend_id(&self) -> BackendId;

    /// Build the request, or fail with `Configuration` if credentials are missing.
    fn build_request(&self, messages: &[Message], config: &GenerationConfig)
        -> Result<DriverRequest>;

    /// Generated text from a successful reply body.
    fn extract_text(&self, body: &Value) -> Option<String>;

    /// Human-readable error message from a failed reply body.
    fn extract_error(&self, body: &Value) -> Option<String>;
}

/// A [`ProviderDriver`] executed over HTTP.
#[derive(Debug)]
pub struct HttpBackend<D> {
    driver: D,
    transport: HttpTransport,
}

impl<D: ProviderDriver> HttpBackend<D> {
    pub fn new(driver: D, transport: HttpTransport) -> Self {
        Self { driver, transport }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}

#[async_trait]
impl<D: ProviderDriver> Backend for HttpBackend<D> {
    fn id(&self) -> BackendId {
        self.driver.backend_id()
    }

    async fn complete(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let backend = self.driver.backend_id();
        let request = self.driver.build_request(messages, config)?;
        let reply = self
            .transport
            .post_json(&request.url, &request.headers, &request.body)
            .await?;

        let parsed: Option<Value> = serde_json::from_str(&reply.body).ok();

        if !reply.is_success() {
            let message = parsed
                .as_ref()
                .and_then(|v| self.driver.extract_error(v))
                .unwrap_or_else(|| fallback_error_message(&reply.body));
            return Err(Error::Backend {
                backend,
                status: reply.status,
                message,
            });
        }

        let body = parsed.ok_or_else(|| Error::Backend {
            backend,
            status: reply.status,
            message: "malformed response body: not valid JSON".to_string(),
        })?;

        let content = self
            .driver
            .extract_text(&body)
            .filter(|t| !t.trim().is_empty())
            .ok_or(Error::EmptyResponse { backend })?;

        Ok(GenerationResult {
            content,
            backend,
            model: Some(request.model),
        })
    }
}

const MAX_RAW_ERROR_CHARS: usize = 200;

fn fallback_error_message(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        "no error details; check the API key and account balance".to_string()
    } else {
        trimmed.chars().take(MAX_RAW_ERROR_CHARS).collect()
    }
}

/// Clients for every backend variant, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct BackendSet {
    backends: HashMap<BackendId, Arc<dyn Backend>>,
}

impl BackendSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// One HTTP client per [`BackendId`], sharing a single transport.
    pub fn from_settings(settings: &Settings, credentials: &Credentials) -> Result<Self> {
        let transport = HttpTransport::new(settings.http_timeout())?;
        let mut set = Self::new();
        for id in BackendId::ALL {
            // New variants must be wired up here.
            let backend: Arc<dyn Backend> = match id {
                BackendId::Yandex => Arc::new(HttpBackend::new(
                    YandexDriver::new(&settings.yandex_base_url, credentials),
                    transport.clone(),
                )),
                BackendId::OpenRouter => Arc::new(HttpBackend::new(
                    OpenRouterDriver::new(&settings.openrouter_base_url, credentials),
                    transport.clone(),
                )),
            };
            set.register(backend);
        }
        Ok(set)
    }

    /// Add or replace the client for `backend.id()`.
    pub fn register(&mut self, backend: Arc<dyn Backend>) {
        self.backends.insert(backend.id(), backend);
    }

    pub fn with(mut self, backend: Arc<dyn Backend>) -> Self {
        self.register(backend);
        self
    }

    pub fn get(&self, id: BackendId) -> Option<&Arc<dyn Backend>> {
        self.backends.get(&id)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
