use std::time::Duration;

use crate::errors::StreamError;
use crate::request::StreamRequest;

/// Client configuration for a chat-completions endpoint.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// API key used for bearer auth.
    pub api_key: String,
    /// Base URL of the OpenAI-compatible endpoint.
    ///
    /// Useful for proxies or local test servers.
    pub base_url: String,
    /// Default HTTP timeout for requests.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Creates a config with sensible defaults and a provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.deepseek.com".to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Builds a config from `DEEPSEEK_API_KEY`.
    pub fn from_env() -> Result<Self, StreamError> {
        let api_key = std::env::var("DEEPSEEK_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(StreamError::MissingCredential);
        }
        Ok(Self::new(api_key))
    }

    /// Overrides the API base URL (for proxies or test servers).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the default HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Derives the chat-completions URL from the base URL.
    pub fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Builds a `StreamRequest` against this config's endpoint and key.
    pub fn request(
        &self,
        model: impl Into<String>,
        user_message: impl Into<String>,
    ) -> StreamRequest {
        StreamRequest::new(
            self.chat_completions_url(),
            self.api_key.clone(),
            model,
            user_message,
        )
    }
}
