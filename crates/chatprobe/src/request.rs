use std::time::Duration;

/// One streaming chat-completion request. Immutable once submitted.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StreamRequest {
    /// Full chat-completions URL.
    pub endpoint: String,
    /// Bearer credential sent in the `Authorization` header.
    pub auth_token: String,
    /// Model identifier (for example `deepseek-reasoner`).
    pub model: String,
    /// Single user message to send.
    pub user_message: String,
}

impl StreamRequest {
    /// Creates a request.
    pub fn new(
        endpoint: impl Into<String>,
        auth_token: impl Into<String>,
        model: impl Into<String>,
        user_message: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth_token: auth_token.into(),
            model: model.into(),
            user_message: user_message.into(),
        }
    }
}

/// Per-run behavior options.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct StreamOptions {
    /// Optional per-request HTTP timeout.
    pub timeout: Option<Duration>,
    /// Bounded snapshot buffer size between the run task and the consumer.
    pub snapshot_buffer_capacity: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            snapshot_buffer_capacity: 32,
        }
    }
}
