//! Wire format of the progress stream.
//!
//! Each event is one `data: <json>` line followed by a blank line, as in
//! `text/event-stream`. Decoding is incremental: bytes may arrive split at
//! any point, including inside a UTF-8 sequence.

use tracing::warn;

use crate::domain::StreamEvent;

/// Prefix of every payload line
pub const DATA_PREFIX: &str = "data: ";

/// JSON payload carried on an event's `data:` line
pub fn event_payload(event: &StreamEvent) -> String {
    // StreamEvent only holds strings and integers, serialization cannot fail
    serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string())
}

/// Encode one event as an SSE frame
pub fn encode_event(event: &StreamEvent) -> String {
    format!("{}{}\n\n", DATA_PREFIX, event_payload(event))
}

/// Decode a single line. Returns `None` for lines that carry no payload.
pub fn decode_line(line: &str) -> Option<Result<StreamEvent, serde_json::Error>> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let data = line.strip_prefix(DATA_PREFIX)?;
    Some(serde_json::from_str(data))
}

/// Incremental decoder for a byte stream of SSE frames
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: Vec<u8>,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every event completed by it.
    ///
    /// Incomplete trailing lines stay buffered until the next chunk.
    /// Malformed payloads are logged and skipped.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]);

            match decode_line(&line) {
                Some(Ok(event)) => events.push(event),
                Some(Err(e)) => warn!(error = %e, line = %line, "Skipping malformed stream event"),
                None => {}
            }
        }

        events
    }

    /// Bytes received but not yet terminated by a newline
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_frame_shape() {
        let frame = encode_event(&StreamEvent::ScriptComplete { pages: 4 });
        assert_eq!(frame, "data: {\"type\":\"script_complete\",\"pages\":4}\n\n");
    }

    #[test]
    fn test_decode_line_ignores_non_data_lines() {
        assert!(decode_line("").is_none());
        assert!(decode_line(": keep-alive").is_none());
        assert!(decode_line("event: status").is_none());
    }

    #[test]
    fn test_keep_alive_comments_between_frames() {
        let wire = format!(
            "{}:\n\n{}",
            encode_event(&StreamEvent::GeneratingPage { page_number: 1 }),
            encode_event(&StreamEvent::Complete)
        );

        let events = StreamDecoder::new().feed(wire.as_bytes());
        assert_eq!(
            events,
            vec![StreamEvent::GeneratingPage { page_number: 1 }, StreamEvent::Complete]
        );
    }

    #[test]
    fn test_decode_line_tolerates_crlf() {
        let event = decode_line("data: {\"type\":\"complete\"}\r").unwrap().unwrap();
        assert_eq!(event, StreamEvent::Complete);
    }

    #[test]
    fn test_chunk_split_mid_line() {
        let frame = encode_event(&StreamEvent::GeneratingPage { page_number: 2 });
        let (a, b) = frame.as_bytes().split_at(10);

        let mut decoder = StreamDecoder::new();
        assert!(decoder.feed(a).is_empty());
        assert!(decoder.pending() > 0);

        let events = decoder.feed(b);
        assert_eq!(events, vec![StreamEvent::GeneratingPage { page_number: 2 }]);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_chunk_split_inside_utf8_sequence() {
        let frame = encode_event(&StreamEvent::status("Génération…"));
        let bytes = frame.as_bytes();
        let split = frame.find('é').unwrap() + 1;

        let mut decoder = StreamDecoder::new();
        let mut events = decoder.feed(&bytes[..split]);
        events.extend(decoder.feed(&bytes[split..]));

        assert_eq!(events, vec![StreamEvent::status("Génération…")]);
    }

    #[test]
    fn test_malformed_payload_skipped() {
        let mut decoder = StreamDecoder::new();
        let mut input = b"data: {not json}\n\n".to_vec();
        input.extend(encode_event(&StreamEvent::Complete).as_bytes());

        assert_eq!(decoder.feed(&input), vec![StreamEvent::Complete]);
    }
}
