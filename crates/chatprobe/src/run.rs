use std::sync::Arc;

use futures::StreamExt as _;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::decode::LineDecoder;
use crate::errors::StreamError;
use crate::event::DeltaEvent;
use crate::request::{StreamOptions, StreamRequest};
use crate::state::{StreamState, Terminal};
use crate::transport::Transport;

/// Handle used to request cancellation of a running stream.
///
/// Cancellation is cooperative: the run task observes the signal at its next
/// suspension point, fixes the terminal state to `Cancelled`, and stops
/// reading. It is never reported as a transport error.
#[derive(Clone, Debug)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    /// Requests cancellation. Idempotent.
    pub fn stop(&self) {
        let _ = self.tx.send(true);
    }
}

/// Streaming handle for one chat-completion run.
///
/// Use `next_state()` to consume cumulative snapshots as they arrive and
/// `finish()` to obtain the terminal result after the last snapshot.
#[derive(Debug)]
pub struct ChatStream {
    request_id: Uuid,
    rx: mpsc::Receiver<StreamState>,
    final_rx: oneshot::Receiver<Result<StreamState, StreamError>>,
    stop_handle: StopHandle,
    saw_terminal: bool,
}

impl ChatStream {
    /// Returns the id attached to this run's log lines.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Returns a handle that can cancel the run.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop_handle.clone()
    }

    /// Requests cancellation of this run.
    pub fn stop(&self) {
        self.stop_handle.stop();
    }

    /// Waits for and returns the next state snapshot.
    ///
    /// Returns `None` after the snapshot channel is closed.
    pub async fn next_state(&mut self) -> Option<StreamState> {
        let snapshot = self.rx.recv().await;
        if let Some(state) = &snapshot
            && state.is_terminal()
        {
            self.saw_terminal = true;
        }
        snapshot
    }

    /// Drains the stream (if needed) and returns the terminal state.
    ///
    /// Cancellation is a successful outcome here: the returned state carries
    /// `Terminal::Cancelled`. Only rejected requests and transport failures
    /// surface as errors.
    pub async fn finish(mut self) -> Result<StreamState, StreamError> {
        while !self.saw_terminal {
            match self.rx.recv().await {
                Some(state) if state.is_terminal() => self.saw_terminal = true,
                Some(_) => {}
                None => break,
            }
        }

        match self.final_rx.await {
            Ok(result) => result,
            Err(_) => Err(StreamError::transport(
                "run task ended without a final result",
            )),
        }
    }
}

pub(crate) fn start_stream(
    transport: Arc<dyn Transport>,
    request: StreamRequest,
    options: StreamOptions,
) -> (ChatStream, StopHandle) {
    let (tx, rx) = mpsc::channel(options.snapshot_buffer_capacity);
    let (final_tx, final_rx) = oneshot::channel();
    let (stop_tx, stop_rx) = watch::channel(false);
    let stop_handle = StopHandle { tx: stop_tx };
    let request_id = Uuid::new_v4();

    tokio::spawn(run_task(
        transport, request, options, request_id, tx, final_tx, stop_rx,
    ));

    let stream = ChatStream {
        request_id,
        rx,
        final_rx,
        stop_handle: stop_handle.clone(),
        saw_terminal: false,
    };
    (stream, stop_handle)
}

/// Resolves once cancellation has been requested.
async fn stop_requested(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // Every stop handle is gone; the run can no longer be cancelled.
            futures::future::pending::<()>().await;
        }
    }
}

async fn run_task(
    transport: Arc<dyn Transport>,
    request: StreamRequest,
    options: StreamOptions,
    request_id: Uuid,
    tx: mpsc::Sender<StreamState>,
    final_tx: oneshot::Sender<Result<StreamState, StreamError>>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut state = StreamState::new();

    // Both suspension points, the connect and every chunk read, race against
    // the stop signal. `biased` keeps the check exact: a pending stop wins
    // over an already-buffered chunk.
    let opened = tokio::select! {
        biased;
        _ = stop_requested(&mut stop_rx) => {
            debug!(request_id = %request_id, "run stopped before connect");
            state.finish(Terminal::Cancelled);
            let _ = tx.send(state.clone()).await;
            let _ = final_tx.send(Ok(state));
            return;
        }
        opened = transport.open(&request, &options) => opened,
    };

    let mut bytes = match opened {
        Ok(stream) => stream,
        Err(err) => {
            debug!(request_id = %request_id, error = %err, "stream request failed before streaming");
            state.finish(Terminal::Errored(err.message()));
            let _ = tx.send(state.clone()).await;
            let _ = final_tx.send(Err(err));
            return;
        }
    };

    state.is_streaming = true;
    debug!(request_id = %request_id, model = %request.model, "chat completion stream accepted");
    if tx.send(state.clone()).await.is_err() {
        // Consumer dropped its handle; abandon the run.
        let _ = final_tx.send(Err(StreamError::Cancelled));
        return;
    }

    let mut decoder = LineDecoder::new();
    loop {
        tokio::select! {
            biased;
            _ = stop_requested(&mut stop_rx) => {
                debug!(request_id = %request_id, "run cancelled by caller");
                state.finish(Terminal::Cancelled);
                let _ = tx.send(state.clone()).await;
                let _ = final_tx.send(Ok(state));
                return;
            }
            next = bytes.next() => match next {
                Some(Ok(chunk)) => {
                    let events = decoder.push_chunk(&chunk);
                    if events.is_empty() {
                        continue;
                    }
                    for event in &events {
                        if let DeltaEvent::Malformed(raw) = event {
                            warn!(request_id = %request_id, raw = %raw, "skipping malformed stream frame");
                        }
                        state.apply(event);
                    }
                    // One snapshot per chunk, after all of its complete lines.
                    if tx.send(state.clone()).await.is_err() {
                        let _ = final_tx.send(Err(StreamError::Cancelled));
                        return;
                    }
                }
                Some(Err(err)) => {
                    debug!(request_id = %request_id, error = %err, "stream read failed");
                    state.finish(Terminal::Errored(err.message()));
                    let _ = tx.send(state.clone()).await;
                    let _ = final_tx.send(Err(err));
                    return;
                }
                None => {
                    state.apply(&DeltaEvent::StreamEnd);
                    debug!(
                        request_id = %request_id,
                        malformed = decoder.malformed_frames(),
                        "stream completed"
                    );
                    let _ = tx.send(state.clone()).await;
                    let _ = final_tx.send(Ok(state));
                    return;
                }
            }
        }
    }
}
