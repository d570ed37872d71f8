//! Streaming chat-completion client with incremental delta accumulation and
//! mid-flight cancellation.
//!
//! The client posts a single user message to an OpenAI-compatible endpoint,
//! decodes the `data: <json>` event stream into two text channels (thinking
//! and final answer), and exposes cumulative state snapshots while the stream
//! is live. A run can be stopped cooperatively at any point.
//!
//! # Streaming usage
//!
//! ```no_run
//! use chatprobe::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), StreamError> {
//! let config = ClientConfig::from_env()?;
//! let client = Client::new(&config)?;
//!
//! let mut stream = client
//!     .start(config.request("deepseek-reasoner", "Say hello"))
//!     .await?;
//!
//! while let Some(state) = stream.next_state().await {
//!     if state.is_terminal() {
//!         break;
//!     }
//! }
//!
//! let state = stream.finish().await?;
//! println!("{}", state.content);
//! # Ok(())
//! # }
//! ```

/// Client entry point: start and stop runs.
pub mod client;
/// Endpoint configuration and request construction.
pub mod config;
/// Incremental line decoder for the wire stream.
pub mod decode;
/// Public error types.
pub mod errors;
/// Decoded delta events and wire payload shapes.
pub mod event;
/// Common imports for typical usage.
pub mod prelude;
/// Request and per-run option types.
pub mod request;
/// Run task, streaming handle, and stop handle.
pub mod run;
/// Accumulated stream state and terminal classification.
pub mod state;
/// Transport seam and the HTTP implementation.
pub mod transport;

pub use client::Client;
pub use config::ClientConfig;
pub use decode::LineDecoder;
pub use errors::StreamError;
pub use event::DeltaEvent;
pub use request::{StreamOptions, StreamRequest};
pub use run::{ChatStream, StopHandle};
pub use state::{StreamState, Terminal};
pub use transport::{ByteStream, HttpTransport, Transport};
