use crate::event::{ChunkPayload, DeltaEvent};

const DATA_PREFIX: &str = "data: ";
const DONE_TOKEN: &str = "[DONE]";

/// Incremental line decoder for the `data: <json>` wire format.
///
/// Chunks are buffered as raw bytes and split on `\n`; the trailing fragment
/// (which may end mid multi-byte character) stays buffered until the next
/// chunk completes it, so chunk boundaries never have to align with line or
/// character boundaries.
#[derive(Default)]
pub struct LineDecoder {
    buf: Vec<u8>,
    malformed: u64,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one raw chunk and returns the events decoded from every
    /// complete line it finished, in arrival order.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<DeltaEvent> {
        self.buf.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(idx) = self.buf.iter().position(|&b| b == b'\n') {
            let line_bytes = self.buf[..idx].to_vec();
            self.buf.drain(..=idx);
            let line = String::from_utf8_lossy(&line_bytes);
            self.decode_line(line.trim(), &mut events);
        }
        events
    }

    /// Number of `data:` payloads that failed JSON parsing so far.
    pub fn malformed_frames(&self) -> u64 {
        self.malformed
    }

    fn decode_line(&mut self, line: &str, out: &mut Vec<DeltaEvent>) {
        if line.is_empty() {
            return;
        }
        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            return;
        };
        // The terminator token is skipped on purpose: end of stream is
        // signalled by the transport read loop, not by this frame.
        if payload == DONE_TOKEN {
            return;
        }
        match serde_json::from_str::<ChunkPayload>(payload) {
            Ok(chunk) => {
                let Some(choice) = chunk.choices.into_iter().next() else {
                    return;
                };
                if let Some(text) = choice.delta.reasoning_content
                    && !text.is_empty()
                {
                    out.push(DeltaEvent::Reasoning(text));
                }
                if let Some(text) = choice.delta.content
                    && !text.is_empty()
                {
                    out.push(DeltaEvent::Content(text));
                }
            }
            Err(_) => {
                self.malformed = self.malformed.saturating_add(1);
                out.push(DeltaEvent::Malformed(payload.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_line(text: &str) -> String {
        format!("data: {{\"choices\":[{{\"delta\":{{\"content\":\"{text}\"}}}}]}}\n")
    }

    fn reasoning_line(text: &str) -> String {
        format!("data: {{\"choices\":[{{\"delta\":{{\"reasoning_content\":\"{text}\"}}}}]}}\n")
    }

    fn fold(events: &[DeltaEvent]) -> (String, String) {
        let mut thinking = String::new();
        let mut content = String::new();
        for event in events {
            match event {
                DeltaEvent::Reasoning(text) => thinking.push_str(text),
                DeltaEvent::Content(text) => content.push_str(text),
                _ => {}
            }
        }
        (thinking, content)
    }

    #[test]
    fn arbitrary_chunk_boundaries_match_single_chunk_delivery() {
        let wire = format!(
            "{}{}{}{}",
            reasoning_line("A"),
            content_line("X"),
            reasoning_line("B"),
            content_line("Y"),
        );
        let bytes = wire.as_bytes();

        let mut whole = LineDecoder::new();
        let expected = fold(&whole.push_chunk(bytes));
        assert_eq!(expected, ("AB".to_string(), "XY".to_string()));

        // Every split point, including mid-line.
        for split in 0..=bytes.len() {
            let mut decoder = LineDecoder::new();
            let mut events = decoder.push_chunk(&bytes[..split]);
            events.extend(decoder.push_chunk(&bytes[split..]));
            assert_eq!(fold(&events), expected, "split at {split}");
        }

        // Byte-at-a-time delivery.
        let mut decoder = LineDecoder::new();
        let mut events = Vec::new();
        for byte in bytes {
            events.extend(decoder.push_chunk(std::slice::from_ref(byte)));
        }
        assert_eq!(fold(&events), expected);
    }

    #[test]
    fn split_inside_multibyte_character_reassembles() {
        let wire = content_line("你好");
        let bytes = wire.as_bytes();
        // Split inside the first CJK character's UTF-8 sequence.
        let mid = wire.find('你').expect("char present") + 1;
        let mut decoder = LineDecoder::new();
        let mut events = decoder.push_chunk(&bytes[..mid]);
        assert!(events.is_empty());
        events.extend(decoder.push_chunk(&bytes[mid..]));
        assert_eq!(events, vec![DeltaEvent::Content("你好".to_string())]);
    }

    #[test]
    fn multiple_lines_in_one_chunk_decode_in_order() {
        let wire = format!("{}{}", content_line("one"), content_line("two"));
        let mut decoder = LineDecoder::new();
        let events = decoder.push_chunk(wire.as_bytes());
        assert_eq!(
            events,
            vec![
                DeltaEvent::Content("one".to_string()),
                DeltaEvent::Content("two".to_string()),
            ]
        );
    }

    #[test]
    fn malformed_payload_is_reported_and_stream_continues() {
        let wire = format!("{}data: {{not json}}\n{}", content_line("a"), content_line("b"));
        let mut decoder = LineDecoder::new();
        let events = decoder.push_chunk(wire.as_bytes());
        assert_eq!(
            events,
            vec![
                DeltaEvent::Content("a".to_string()),
                DeltaEvent::Malformed("{not json}".to_string()),
                DeltaEvent::Content("b".to_string()),
            ]
        );
        assert_eq!(decoder.malformed_frames(), 1);
    }

    #[test]
    fn done_token_produces_no_event() {
        let mut decoder = LineDecoder::new();
        let events = decoder.push_chunk(b"data: [DONE]\n");
        assert!(events.is_empty());
        assert_eq!(decoder.malformed_frames(), 0);
    }

    #[test]
    fn both_channels_can_fire_from_a_single_line() {
        let mut decoder = LineDecoder::new();
        let events = decoder.push_chunk(
            b"data: {\"choices\":[{\"delta\":{\"reasoning_content\":\"hm\",\"content\":\"hi\"}}]}\n",
        );
        assert_eq!(
            events,
            vec![
                DeltaEvent::Reasoning("hm".to_string()),
                DeltaEvent::Content("hi".to_string()),
            ]
        );
    }

    #[test]
    fn non_data_lines_and_empty_deltas_are_ignored() {
        let mut decoder = LineDecoder::new();
        let wire = b"\n: keepalive\nevent: ping\ndata: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\ndata: {\"choices\":[{\"delta\":{\"content\":\"\"}}]}\n";
        let events = decoder.push_chunk(wire);
        assert!(events.is_empty());
        assert_eq!(decoder.malformed_frames(), 0);
    }

    #[test]
    fn trailing_fragment_waits_for_its_newline() {
        let wire = content_line("late");
        let (head, tail) = wire.split_at(wire.len() - 1);
        let mut decoder = LineDecoder::new();
        assert!(decoder.push_chunk(head.as_bytes()).is_empty());
        assert_eq!(
            decoder.push_chunk(tail.as_bytes()),
            vec![DeltaEvent::Content("late".to_string())]
        );
    }

    #[test]
    fn crlf_line_endings_are_tolerated() {
        let mut decoder = LineDecoder::new();
        let events =
            decoder.push_chunk(b"data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\r\n");
        assert_eq!(events, vec![DeltaEvent::Content("ok".to_string())]);
    }
}
