//! Shared fixtures: a mockito server for the wire formats and a scripted
//! in-process backend for orchestration and pipeline tests.

use article_digest::drivers::{Backend, HttpBackend, OpenRouterDriver, YandexDriver};
use article_digest::transport::HttpTransport;
use article_digest::{BackendId, Credentials, Error, GenerationConfig, GenerationResult, Message, Result};
use async_trait::async_trait;
use mockito::{Matcher, Mock, Server, ServerGuard};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

pub const YANDEX_PATH: &str = "/foundationModels/v1/completion";
pub const OPENROUTER_PATH: &str = "/api/v1/chat/completions";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    pub fn yandex(&self, credentials: &Credentials) -> HttpBackend<YandexDriver> {
        HttpBackend::new(YandexDriver::new(&self.base_url, credentials), transport())
    }

    pub fn openrouter(&self, credentials: &Credentials) -> HttpBackend<OpenRouterDriver> {
        HttpBackend::new(OpenRouterDriver::new(&self.base_url, credentials), transport())
    }

    /// JSON reply on `path`, expected exactly `hits` times.
    pub async fn mock_json(&mut self, path: &str, status: usize, body: &str, hits: usize) -> Mock {
        self.server
            .mock("POST", path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }

    /// Yandex success reply, checked against auth headers and `partial` body fields.
    pub async fn mock_yandex_ok(&mut self, key: &str, folder: &str, partial: serde_json::Value, text: &str) -> Mock {
        let body = serde_json::json!({
            "result": {
                "alternatives": [{ "message": { "role": "assistant", "text": text }, "status": "ALTERNATIVE_STATUS_FINAL" }],
                "modelVersion": "23.10.2024"
            }
        });
        self.server
            .mock("POST", YANDEX_PATH)
            .match_header("authorization", format!("Api-Key {}", key).as_str())
            .match_header("x-folder-id", folder)
            .match_body(Matcher::PartialJson(partial))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    pub async fn mock_openrouter_ok(&mut self, text: &str, hits: usize) -> Mock {
        let body = serde_json::json!({
            "id": "gen-1",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": text } }]
        });
        self.mock_json(OPENROUTER_PATH, 200, &body.to_string(), hits).await
    }
}

fn transport() -> HttpTransport {
    HttpTransport::new(Duration::from_secs(5)).unwrap()
}

/// One scripted outcome for [`ScriptedBackend`].
#[derive(Debug, Clone)]
pub enum Step {
    Reply(&'static str),
    Fail(u16),
}

/// Backend that plays a script of outcomes, then answers `out{n}` where `n`
/// is the 1-based call number. Records every user prompt with its time.
#[derive(Debug)]
pub struct ScriptedBackend {
    id: BackendId,
    script: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<(Instant, String)>>,
}

impl ScriptedBackend {
    pub fn new(id: BackendId, script: impl IntoIterator<Item = Step>) -> Self {
        Self {
            id,
            script: Mutex::new(script.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always_failing(id: BackendId, status: u16) -> Self {
        Self::new(id, std::iter::repeat(Step::Fail(status)).take(100))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(_, p)| p.clone()).collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn id(&self) -> BackendId {
        self.id
    }

    async fn complete(&self, messages: &[Message], config: &GenerationConfig) -> Result<GenerationResult> {
        let prompt = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((Instant::now(), prompt));
            calls.len()
        };
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step::Fail(status)) => Err(Error::Backend {
                backend: self.id,
                status,
                message: format!("scripted failure on call {}", n),
            }),
            Some(Step::Reply(text)) => Ok(GenerationResult {
                content: text.to_string(),
                backend: self.id,
                model: config.model.clone(),
            }),
            None => Ok(GenerationResult {
                content: format!("out{}", n),
                backend: self.id,
                model: config.model.clone(),
            }),
        }
    }
}
