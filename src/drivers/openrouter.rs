//! OpenRouter driver (OpenAI-compatible chat completions).

use serde_json::{json, Value};
use std::collections::HashMap;

use super::{join_url, DriverRequest, ProviderDriver};
use crate::config::Credentials;
use crate::types::{BackendId, GenerationConfig, Message};
use crate::{Error, ErrorContext, Result};

const DEFAULT_MODEL: &str = "deepseek/deepseek-chat";
const COMPLETION_PATH: &str = "/api/v1/chat/completions";

#[derive(Debug, Clone)]
pub struct OpenRouterDriver {
    base_url: String,
    api_key: Option<String>,
    referer: String,
}

impl OpenRouterDriver {
    pub fn new(base_url: impl Into<String>, credentials: &Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: credentials.openrouter_api_key.clone(),
            referer: credentials.app_url().to_string(),
        }
    }
}

impl ProviderDriver for OpenRouterDriver {
    fn backend_id(&self) -> BackendId {
        BackendId::OpenRouter
    }

    fn build_request(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> Result<DriverRequest> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            Error::configuration_with_context(
                "OpenRouter API key is not configured",
                ErrorContext::new()
                    .with_field_path("OPENROUTER_API_KEY")
                    .with_source("openrouter_driver"),
            )
        })?;
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL).to_string();

        let body = json!({
            "model": model,
            "messages": messages,
            "temperature": config.temperature,
            "max_tokens": config.max_output_tokens,
        });

        let mut headers = HashMap::new();
        headers.insert("authorization".to_string(), format!("Bearer {}", api_key));
        headers.insert("http-referer".to_string(), self.referer.clone());

        Ok(DriverRequest {
            url: join_url(&self.base_url, COMPLETION_PATH),
            headers,
            body,
            model,
        })
    }

    fn extract_text(&self, body: &Value) -> Option<String> {
        body.pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(String::from)
    }

    fn extract_error(&self, body: &Value) -> Option<String> {
        body.pointer("/error/message")
            .and_then(|v| v.as_str())
            .map(String::from)
    }
}
