use crate::event::DeltaEvent;

/// Final classification of a run once no further mutation will occur.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Terminal {
    /// The transport signalled end-of-data.
    Completed,
    /// The caller stopped the run.
    Cancelled,
    /// The run failed; carries a human-readable message.
    Errored(String),
}

/// Accumulated view of one streaming run.
///
/// The run task owns the live value and mutates it in place; callers only
/// ever receive cloned snapshots, so no synchronization is needed to read it.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StreamState {
    /// Append-only reasoning/thinking text.
    pub thinking: String,
    /// Append-only final-answer text.
    pub content: String,
    /// True from stream acceptance until any terminal state.
    pub is_streaming: bool,
    /// Set exactly once when the run completes, is cancelled, or errors.
    pub terminal: Option<Terminal>,
}

impl StreamState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one decoded event into the accumulators.
    pub fn apply(&mut self, event: &DeltaEvent) {
        match event {
            DeltaEvent::Reasoning(text) => self.thinking.push_str(text),
            DeltaEvent::Content(text) => self.content.push_str(text),
            DeltaEvent::StreamEnd => self.finish(Terminal::Completed),
            DeltaEvent::Malformed(_) => {}
        }
    }

    /// Freezes the state. The first terminal wins; later calls only make sure
    /// the streaming flag is down.
    pub fn finish(&mut self, terminal: Terminal) {
        if self.terminal.is_none() {
            self.terminal = Some(terminal);
        }
        self.is_streaming = false;
    }

    /// True once a terminal state has been set.
    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_append_in_order_per_channel() {
        let mut state = StreamState::new();
        for event in [
            DeltaEvent::Reasoning("A".into()),
            DeltaEvent::Content("X".into()),
            DeltaEvent::Reasoning("B".into()),
            DeltaEvent::Content("Y".into()),
        ] {
            state.apply(&event);
        }
        assert_eq!(state.thinking, "AB");
        assert_eq!(state.content, "XY");
    }

    #[test]
    fn malformed_events_leave_accumulators_untouched() {
        let mut state = StreamState::new();
        state.apply(&DeltaEvent::Content("x".into()));
        state.apply(&DeltaEvent::Malformed("{oops".into()));
        assert_eq!(state.content, "x");
        assert!(!state.is_terminal());
    }

    #[test]
    fn stream_end_completes_the_state() {
        let mut state = StreamState::new();
        state.is_streaming = true;
        state.apply(&DeltaEvent::StreamEnd);
        assert_eq!(state.terminal, Some(Terminal::Completed));
        assert!(!state.is_streaming);
    }

    #[test]
    fn first_terminal_state_wins() {
        let mut state = StreamState::new();
        state.is_streaming = true;
        state.finish(Terminal::Cancelled);
        state.finish(Terminal::Completed);
        assert_eq!(state.terminal, Some(Terminal::Cancelled));
        assert!(!state.is_streaming);
    }
}
