use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::config::ClientConfig;
use crate::errors::StreamError;
use crate::request::{StreamOptions, StreamRequest};
use crate::run::{ChatStream, StopHandle, start_stream};
use crate::transport::{HttpTransport, Transport};

/// Entry point for starting and stopping streaming chat-completion runs.
///
/// The client assumes callers serialize requests: one run in flight at a
/// time. Starting a new run while one is live stops the old one first.
pub struct Client {
    transport: Arc<dyn Transport>,
    active: Mutex<Option<StopHandle>>,
}

impl Client {
    /// Creates a client backed by the HTTP transport.
    pub fn new(config: &ClientConfig) -> Result<Self, StreamError> {
        Ok(Self::with_transport(Arc::new(HttpTransport::new(
            config.timeout,
        )?)))
    }

    /// Creates a client over an explicit transport (used by tests).
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            active: Mutex::new(None),
        }
    }

    /// Starts a streaming run with default options.
    ///
    /// Fails up front, before any transport call, with `MissingCredential`
    /// when the request carries no bearer token.
    pub async fn start(&self, request: StreamRequest) -> Result<ChatStream, StreamError> {
        self.start_with_options(request, StreamOptions::default())
            .await
    }

    /// Starts a streaming run with explicit options.
    pub async fn start_with_options(
        &self,
        request: StreamRequest,
        options: StreamOptions,
    ) -> Result<ChatStream, StreamError> {
        validate(&request, &options)?;
        let (stream, stop_handle) = start_stream(self.transport.clone(), request, options);
        let mut active = self.active.lock().expect("active stop handle lock");
        if let Some(previous) = active.replace(stop_handle) {
            debug!(request_id = %stream.request_id(), "replacing in-flight run, stopping previous");
            previous.stop();
        }
        Ok(stream)
    }

    /// Stops the current run, if any. Idempotent; no-op when nothing is in
    /// flight.
    pub fn stop(&self) {
        if let Some(handle) = self.active.lock().expect("active stop handle lock").as_ref() {
            handle.stop();
        }
    }
}

fn validate(request: &StreamRequest, options: &StreamOptions) -> Result<(), StreamError> {
    if request.auth_token.trim().is_empty() {
        return Err(StreamError::MissingCredential);
    }
    if request.user_message.trim().is_empty() {
        return Err(StreamError::invalid("user message must not be empty"));
    }
    if request.model.trim().is_empty() {
        return Err(StreamError::invalid("model must not be empty"));
    }
    if request.endpoint.trim().is_empty() {
        return Err(StreamError::invalid("endpoint must not be empty"));
    }
    if options.snapshot_buffer_capacity == 0 {
        return Err(StreamError::invalid(
            "snapshot_buffer_capacity must be greater than 0",
        ));
    }
    Ok(())
}
