//! YandexGPT foundation models driver.
//!
//! Differences from OpenAI-style APIs:
//! - Auth is `Authorization: Api-Key <key>` plus an `x-folder-id` header.
//! - The model is addressed by URI: `gpt://<folder>/<model>`.
//! - Messages carry `text` instead of `content`.
//! - Generated text lives at `result.alternatives[0].message.text`.

use serde_json::{json, Value};
use std::collections::HashMap;

use super::{join_url, DriverRequest, ProviderDriver};
use crate::config::Credentials;
use crate::types::{BackendId, GenerationConfig, Message};
use crate::{Error, ErrorContext, Result};

const DEFAULT_MODEL: &str = "yandexgpt/latest";
const COMPLETION_PATH: &str = "/foundationModels/v1/completion";

#[derive(Debug, Clone)]
pub struct YandexDriver {
    base_url: String,
    api_key: Option<String>,
    folder_id: Option<String>,
}

impl YandexDriver {
    pub fn new(base_url: impl Into<String>, credentials: &Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: credentials.yandex_api_key.clone(),
            folder_id: credentials.yandex_folder_id.clone(),
        }
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        let missing = |field: &str| {
            Error::configuration_with_context(
                "YandexGPT API key or folder id is not configured",
                ErrorContext::new()
                    .with_field_path(field)
                    .with_details("set YANDEX_GPT_API_KEY and YANDEX_FOLDER_ID")
                    .with_source("yandex_driver"),
            )
        };
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| missing("YANDEX_GPT_API_KEY"))?;
        let folder = self
            .folder_id
            .as_deref()
            .ok_or_else(|| missing("YANDEX_FOLDER_ID"))?;
        Ok((key, folder))
    }
}

impl ProviderDriver for YandexDriver {
    fn backend_id(&self) -> BackendId {
        BackendId::Yandex
    }

    fn build_request(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> Result<DriverRequest> {
        let (api_key, folder_id) = self.credentials()?;
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL).to_string();

        let body = json!({
            "modelUri": format!("gpt://{}/{}", folder_id, model),
            "completionOptions": {
                "stream": false,
                "temperature": config.temperature,
                "maxTokens": config.max_output_tokens,
            },
            "messages": messages
                .iter()
                .map(|m| json!({ "role": m.role.as_str(), "text": m.content }))
                .collect::<Vec<_>>(),
        });

        let mut headers = HashMap::new();
        headers.insert("authorization".to_string(), format!("Api-Key {}", api_key));
        headers.insert("x-folder-id".to_string(), folder_id.to_string());

        Ok(DriverRequest {
            url: join_url(&self.base_url, COMPLETION_PATH),
            headers,
            body,
            model,
        })
    }

    fn extract_text(&self, body: &Value) -> Option<String> {
        body.pointer("/result/alternatives/0/message/text")
            .and_then(|v| v.as_str())
            .map(String::from)
    }

    fn extract_error(&self, body: &Value) -> Option<String> {
        body.get("message")
            .or_else(|| body.pointer("/error/message"))
            .and_then(|v| v.as_str())
            .map(String::from)
    }
}
