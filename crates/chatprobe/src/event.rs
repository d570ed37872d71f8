/// A single decoded unit from the wire stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeltaEvent {
    /// Increment of thinking/reasoning text.
    Reasoning(String),
    /// Increment of final-answer text.
    Content(String),
    /// No further events will arrive; produced when the transport read loop
    /// observes end-of-data, never from the `[DONE]` wire token.
    StreamEnd,
    /// A `data:` payload that failed JSON parsing. Carries the raw payload.
    Malformed(String),
}

/// Wire shape of one streamed chat-completion chunk.
///
/// Only the fields this client consumes are modeled; everything else in the
/// payload is ignored by serde.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ChunkPayload {
    #[serde(default)]
    pub choices: Vec<ChoicePayload>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct ChoicePayload {
    #[serde(default)]
    pub delta: DeltaPayload,
}

#[derive(Debug, Default, serde::Deserialize)]
pub(crate) struct DeltaPayload {
    pub reasoning_content: Option<String>,
    pub content: Option<String>,
}
