//! Line-oriented parser for the server-sent-event framing used by the chat
//! completions stream. Transport hands in raw text chunks; the parser hands
//! back complete events, keeping any partial trailing line buffered. The
//! resulting event sequence is finite and not restartable.

/// Marker every payload line starts with.
const DATA_PREFIX: &str = "data:";

/// Sentinel payload that closes the stream.
const DONE_SENTINEL: &str = "[DONE]";

/// One decoded stream event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Payload of one `data: ` line, marker stripped, JSON not yet parsed.
    Data(String),
    /// The literal `[DONE]` terminator.
    Done,
}

/// Incremental parser over transport chunks of arbitrary size.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: String,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one transport chunk and returns the events it completed.
    /// Lines may span multiple chunks; the unfinished tail stays buffered.
    pub fn push(&mut self, chunk: &str) -> Vec<SseEvent> {
        self.buffer.push_str(chunk);

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            if let Some(event) = decode_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Consumes the parser once the transport has closed, decoding a final
    /// unterminated line if one is buffered.
    pub fn finish(self) -> Option<SseEvent> {
        decode_line(&self.buffer)
    }
}

fn decode_line(line: &str) -> Option<SseEvent> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return None;
    }

    // The vendor frames every payload as "data: ...". A missing marker is
    // tolerated: the line is passed through and the JSON layer above skips
    // whatever fails to decode.
    let payload = match line.strip_prefix(DATA_PREFIX) {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None => line,
    };

    if payload == DONE_SENTINEL {
        Some(SseEvent::Done)
    } else {
        Some(SseEvent::Data(payload.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_marker_and_detects_done() {
        let mut parser = SseParser::new();
        let events = parser.push("data: {\"a\":1}\n\ndata: [DONE]\n");

        assert_eq!(
            events,
            vec![
                SseEvent::Data("{\"a\":1}".to_string()),
                SseEvent::Done,
            ]
        );
    }

    #[test]
    fn lines_split_across_chunks_are_reassembled() {
        let mut parser = SseParser::new();
        assert!(parser.push("data: {\"choices\":").is_empty());
        let events = parser.push("[]}\n");

        assert_eq!(events, vec![SseEvent::Data("{\"choices\":[]}".to_string())]);
    }

    #[test]
    fn crlf_and_blank_lines_are_handled() {
        let mut parser = SseParser::new();
        let events = parser.push("data: one\r\n\r\ndata: two\r\n");

        assert_eq!(
            events,
            vec![
                SseEvent::Data("one".to_string()),
                SseEvent::Data("two".to_string()),
            ]
        );
    }

    #[test]
    fn unmarked_lines_pass_through_for_the_json_layer() {
        let mut parser = SseParser::new();
        let events = parser.push(": keep-alive\n");

        assert_eq!(events, vec![SseEvent::Data(": keep-alive".to_string())]);
    }

    #[test]
    fn finish_flushes_a_trailing_line() {
        let mut parser = SseParser::new();
        assert!(parser.push("data: tail").is_empty());
        assert_eq!(parser.finish(), Some(SseEvent::Data("tail".to_string())));

        let parser = SseParser::new();
        assert_eq!(parser.finish(), None);
    }
}
