//! Incremental decoder for `text/event-stream` bodies.
//!
//! The generation-2 subscription endpoint keeps one HTTP response open and
//! writes server-sent events into it. Chunks arrive at arbitrary boundaries
//! (mid-line, even mid UTF-8 sequence), so the decoder buffers raw bytes and
//! only emits an [`SseEvent`] once the blank line that terminates it has been
//! seen.

use serde::Deserialize;

use crate::error::{CodecError, CodecResult};

/// A single dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseEvent {
    /// Value of the `event:` field, if any
    pub event: Option<String>,
    /// Concatenated `data:` lines, joined with `\n`
    pub data: String,
    /// Value of the last `id:` field, if any
    pub id: Option<String>,
}

/// Byte-oriented SSE frame decoder.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    pending: PendingEvent,
}

#[derive(Debug, Default)]
struct PendingEvent {
    event: Option<String>,
    data: Vec<String>,
    id: Option<String>,
}

impl PendingEvent {
    fn is_empty(&self) -> bool {
        self.event.is_none() && self.data.is_empty() && self.id.is_none()
    }

    fn take(&mut self) -> Option<SseEvent> {
        let pending = std::mem::take(self);
        // Events without data are not dispatched
        if pending.data.is_empty() {
            return None;
        }
        Some(SseEvent {
            event: pending.event,
            data: pending.data.join("\n"),
            id: pending.id,
        })
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of the response body and collect every completed event.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }

            let line = String::from_utf8_lossy(&line);
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush whatever is buffered when the stream ends.
    pub fn finish(&mut self) -> Option<SseEvent> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest).into_owned();
            let line = line.trim_end_matches('\r');
            self.process_line(line);
        }
        if self.pending.is_empty() {
            None
        } else {
            self.pending.take()
        }
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.pending.take();
        }

        // Comment line, used by servers as keep-alive
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => self.pending.data.push(value.to_string()),
            "event" => self.pending.event = Some(value.to_string()),
            "id" => self.pending.id = Some(value.to_string()),
            // `retry` and unknown fields carry nothing we act on
            _ => {}
        }
        None
    }
}

/// First event on a fresh subscription stream: the server-issued lease.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeaseAnnouncement {
    #[serde(rename = "sessionUUID")]
    pub session_uuid: String,
    pub path: String,
}

impl LeaseAnnouncement {
    /// Parse an event payload as a lease announcement.
    ///
    /// Returns `Ok(None)` for valid JSON that is not an announcement (i.e. an
    /// ordinary state push), and an error only for malformed JSON.
    pub fn from_event_data(data: &str) -> CodecResult<Option<Self>> {
        let value: serde_json::Value = serde_json::from_str(data.trim())
            .map_err(|e| CodecError::JsonDeserializationFailed(e.to_string()))?;

        let has_lease = value
            .get("sessionUUID")
            .and_then(serde_json::Value::as_str)
            .map_or(false, |uuid| !uuid.is_empty());
        if !has_lease || value.get("path").is_none() {
            return Ok(None);
        }

        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| CodecError::JsonDeserializationFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: {\"a\":").is_empty());
        assert!(decoder.feed(b"1}\n").is_empty());
        let events = decoder.feed(b"\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "{\"a\":1}");
    }

    #[test]
    fn test_crlf_and_multiline_data() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"event: update\r\ndata: line1\r\ndata: line2\r\nid: 7\r\n\r\n");
        assert_eq!(
            events,
            vec![SseEvent {
                event: Some("update".to_string()),
                data: "line1\nline2".to_string(),
                id: Some("7".to_string()),
            }]
        );
    }

    #[test]
    fn test_comments_and_empty_events_are_skipped() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b": keep-alive\n\nevent: ping\n\ndata: x\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "x");
    }

    #[test]
    fn test_utf8_split_inside_codepoint() {
        let mut decoder = SseDecoder::new();
        let bytes = "data: \"Bühne\"\n\n".as_bytes();
        let split = bytes.iter().position(|&b| b == 0xc3).unwrap() + 1;
        assert!(decoder.feed(&bytes[..split]).is_empty());
        let events = decoder.feed(&bytes[split..]);
        assert_eq!(events[0].data, "\"Bühne\"");
    }

    #[test]
    fn test_finish_flushes_unterminated_event() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: tail").is_empty());
        assert_eq!(decoder.finish().map(|e| e.data), Some("tail".to_string()));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_lease_announcement() {
        let lease = LeaseAnnouncement::from_event_data(r#"{"sessionUUID":"abc","path":"/x"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(lease.session_uuid, "abc");
        assert_eq!(lease.path, "/x");

        let push = LeaseAnnouncement::from_event_data(r#"{"/api/channel/0":{"mute":true}}"#).unwrap();
        assert!(push.is_none());

        assert!(LeaseAnnouncement::from_event_data("{oops").is_err());
    }
}
