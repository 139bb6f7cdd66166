use keyring::Entry;
use std::env;
use tracing::debug;

const KEYRING_SERVICE: &str = "article-digest";
const DEFAULT_APP_URL: &str = "http://localhost:3000";

/// Backend credentials, resolved once at start-up.
///
/// Absent values are not an error here: the driver that needs them fails
/// with a configuration error when it is asked to complete a prompt.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub yandex_api_key: Option<String>,
    pub yandex_folder_id: Option<String>,
    pub openrouter_api_key: Option<String>,
    /// Sent as the OpenRouter `HTTP-Referer`.
    pub app_url: Option<String>,
}

impl Credentials {
    /// Environment only.
    pub fn from_env() -> Self {
        Self {
            yandex_api_key: env_non_empty("YANDEX_GPT_API_KEY"),
            yandex_folder_id: env_non_empty("YANDEX_FOLDER_ID"),
            openrouter_api_key: env_non_empty("OPENROUTER_API_KEY"),
            app_url: env_non_empty("APP_URL"),
        }
    }

    /// OS keyring first, then the environment.
    pub fn resolve() -> Self {
        Self {
            yandex_api_key: from_keyring("YANDEX_GPT_API_KEY")
                .or_else(|| env_non_empty("YANDEX_GPT_API_KEY")),
            yandex_folder_id: from_keyring("YANDEX_FOLDER_ID")
                .or_else(|| env_non_empty("YANDEX_FOLDER_ID")),
            openrouter_api_key: from_keyring("OPENROUTER_API_KEY")
                .or_else(|| env_non_empty("OPENROUTER_API_KEY")),
            app_url: env_non_empty("APP_URL"),
        }
    }

    pub fn with_yandex(mut self, api_key: impl Into<String>, folder_id: impl Into<String>) -> Self {
        self.yandex_api_key = Some(api_key.into());
        self.yandex_folder_id = Some(folder_id.into());
        self
    }

    pub fn with_openrouter(mut self, api_key: impl Into<String>) -> Self {
        self.openrouter_api_key = Some(api_key.into());
        self
    }

    pub fn with_app_url(mut self, url: impl Into<String>) -> Self {
        self.app_url = Some(url.into());
        self
    }

    pub fn app_url(&self) -> &str {
        self.app_url.as_deref().unwrap_or(DEFAULT_APP_URL)
    }
}

// Secrets stay out of Debug output.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn mask(v: &Option<String>) -> &'static str {
            if v.is_some() {
                "<set>"
            } else {
                "<unset>"
            }
        }
        f.debug_struct("Credentials")
            .field("yandex_api_key", &mask(&self.yandex_api_key))
            .field("yandex_folder_id", &self.yandex_folder_id)
            .field("openrouter_api_key", &mask(&self.openrouter_api_key))
            .field("app_url", &self.app_url)
            .finish()
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn from_keyring(name: &str) -> Option<String> {
    let entry = Entry::new(KEYRING_SERVICE, name).ok()?;
    match entry.get_password() {
        Ok(secret) if !secret.trim().is_empty() => {
            debug!(credential = name, "credential loaded from keyring");
            Some(secret)
        }
        _ => None,
    }
}
