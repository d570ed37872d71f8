/// Errors surfaced by the client API and the streaming run.
///
/// Malformed wire frames are deliberately absent: a frame that fails to parse
/// is reported as a `DeltaEvent::Malformed` and the stream continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    /// No bearer credential was available; the request was never sent.
    #[error("missing api credential")]
    MissingCredential,
    /// Invalid request input (empty message, model, or endpoint).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Server rejected the request with a non-success status before any
    /// streaming began.
    #[error("request rejected ({status}): {message}")]
    RequestRejected { status: u16, message: String },
    /// Network-level failure during connect or a mid-stream read.
    #[error("transport failure: {message}")]
    TransportFailure { message: String },
    /// The run was stopped by the caller.
    #[error("stream cancelled")]
    Cancelled,
}

impl StreamError {
    /// Creates an invalid-request error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Creates a transport-level error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportFailure {
            message: message.into(),
        }
    }

    /// Creates a rejected-request error.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::RequestRejected {
            status,
            message: message.into(),
        }
    }

    /// Returns the human-readable message carried by this error.
    pub fn message(&self) -> String {
        match self {
            Self::RequestRejected { message, .. } | Self::TransportFailure { message } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}
