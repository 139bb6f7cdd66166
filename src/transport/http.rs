use std::collections::HashMap;
use std::env;
use std::time::Duration;

use reqwest::Proxy;
use tracing::debug;

use crate::error::TransportError;
use crate::{Error, Result};

/// Status and raw body of a completed HTTP exchange.
///
/// Any status is returned as a reply; only failures to obtain a response at
/// all (connect, TLS, timeout) become errors.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Pooled `reqwest` client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(
                env::var("DIGEST_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(8),
            )
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Ok(proxy_url) = env::var("DIGEST_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::Network(TransportError::Other(e.to_string())))?;
        Ok(Self { client })
    }

    /// POST a JSON body and read the full response text.
    pub async fn post_json(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        body: &serde_json::Value,
    ) -> Result<HttpReply> {
        let mut request = self.client.post(url).json(body);
        for (k, v) in headers {
            request = request.header(k.as_str(), v.as_str());
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(url, http_status = status, body_len = body.len(), "backend replied");
        Ok(HttpReply { status, body })
    }
}
