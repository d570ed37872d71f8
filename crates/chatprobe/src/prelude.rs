//! Common imports for typical client usage.
pub use crate::{
    ChatStream, Client, ClientConfig, DeltaEvent, StopHandle, StreamError, StreamOptions,
    StreamRequest, StreamState, Terminal,
};
