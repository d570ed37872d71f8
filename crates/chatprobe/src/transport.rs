use std::pin::Pin;
use std::time::Duration;

use futures::StreamExt as _;
use tracing::debug;

use crate::errors::StreamError;
use crate::request::{StreamOptions, StreamRequest};

/// Raw body bytes as they arrive from the server.
pub type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, StreamError>> + Send + 'static>>;

/// Seam between the run loop and the network.
///
/// The production implementation is `HttpTransport`; tests substitute scripted
/// fakes to drive the decode loop without sockets.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Opens the streaming request and returns the raw byte stream.
    ///
    /// A non-success HTTP status reads the full (non-streamed) error body and
    /// fails with `RequestRejected`, so the caller never enters streaming mode
    /// for a rejected request.
    async fn open(
        &self,
        request: &StreamRequest,
        options: &StreamOptions,
    ) -> Result<ByteStream, StreamError>;
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with the given default request timeout.
    pub fn new(timeout: Duration) -> Result<Self, StreamError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StreamError::transport(format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn open(
        &self,
        request: &StreamRequest,
        options: &StreamOptions,
    ) -> Result<ByteStream, StreamError> {
        let body = build_request_body(request);
        debug!(endpoint = %request.endpoint, model = %request.model, "opening chat completion stream");

        let mut http_req = self
            .client
            .post(&request.endpoint)
            .bearer_auth(&request.auth_token)
            .json(&body);
        if let Some(timeout) = options.timeout {
            http_req = http_req.timeout(timeout);
        }

        let response = http_req
            .send()
            .await
            .map_err(|e| StreamError::transport(format!("request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StreamError::rejected(
                status.as_u16(),
                extract_error_message(&body, status.as_u16()),
            ));
        }

        let stream = response
            .bytes_stream()
            .map(|item| item.map_err(|e| StreamError::transport(format!("stream read failed: {e}"))));
        Ok(Box::pin(stream))
    }
}

pub(crate) fn build_request_body(request: &StreamRequest) -> serde_json::Value {
    serde_json::json!({
        "model": request.model,
        "messages": [{ "role": "user", "content": request.user_message }],
        "stream": true,
    })
}

/// Pulls `error.message` out of a rejection body, falling back to a generic
/// message when the body is empty or not the expected shape.
pub(crate) fn extract_error_message(body: &str, status: u16) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| format!("request failed with status {status}"))
}
