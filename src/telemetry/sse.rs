//! Incremental `text/event-stream` decoder.
//!
//! Bytes arrive in arbitrary chunks from the HTTP body. The decoder buffers
//! partial lines (including a UTF-8 sequence split across chunks) and emits
//! complete frames as soon as the blank line that ends an event arrives.
//!
//! Supported fields:
//!
//! | Field | Effect |
//! |-------|--------|
//! | `event` | event name (default `message`) |
//! | `data` | appended; multiple lines joined with `\n` |
//! | `id` | last event id |
//! | `retry` | reconnect delay in ms, emitted immediately as [`SseFrame::Retry`] |
//! | `:...` | comment, emitted as [`SseFrame::Comment`] (servers send these as keep-alives) |
//!
//! Lines end with LF, CRLF or a lone CR. An event with no `data` line is
//! dropped, as browsers do. A line or an event that grows past
//! [`MAX_EVENT_BYTES`] is dropped whole; decoding resumes with the next event.

use std::time::Duration;

use bytes::BytesMut;
use log::warn;

/// A dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    Event(SseEvent),
    /// Server-requested reconnect delay.
    Retry(Duration),
    /// Comment line. Carries nothing but proves the connection is alive.
    Comment,
}

const DEFAULT_EVENT: &str = "message";

/// Upper bound for one line and for the accumulated data of one event.
pub const MAX_EVENT_BYTES: usize = 1024 * 1024;

#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: BytesMut,
    /// Last byte consumed was a CR, so a leading LF in the next chunk belongs to it.
    pending_cr: bool,
    event: Option<String>,
    data: Option<String>,
    last_id: Option<String>,
    /// Skip the rest of the current line (its head was dropped).
    discard_line: bool,
    /// Skip every field until the blank line that ends the current event.
    discard_event: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one body chunk and return every frame it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        let mut chunk = chunk;
        if self.pending_cr {
            self.pending_cr = false;
            if let Some(rest) = chunk.strip_prefix(b"\n") {
                chunk = rest;
            }
        }
        self.buf.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n' || b == b'\r') {
            let line = self.buf.split_to(pos);
            let terminator = self.buf.split_to(1);

            if terminator[0] == b'\r' {
                match self.buf.first() {
                    Some(&b'\n') => drop(self.buf.split_to(1)),
                    Some(_) => {}
                    None => self.pending_cr = true,
                }
            }

            if self.discard_line {
                self.discard_line = false;
                continue;
            }

            let line = String::from_utf8_lossy(&line);
            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }

        if self.buf.len() > MAX_EVENT_BYTES {
            warn!("telemetry: dropping event with a {} byte line", self.buf.len());
            self.buf.clear();
            self.discard_line = true;
            self.drop_event();
        }
        frames
    }

    fn drop_event(&mut self) {
        self.discard_event = true;
        self.event = None;
        self.data = None;
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            if self.discard_event {
                self.discard_event = false;
                return None;
            }
            return self.dispatch();
        }
        if line.starts_with(':') {
            return Some(SseFrame::Comment);
        }
        if self.discard_event {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_owned()),
            "data" => {
                let len = match self.data.as_mut() {
                    Some(data) => {
                        data.push('\n');
                        data.push_str(value);
                        data.len()
                    }
                    None => {
                        self.data = Some(value.to_owned());
                        value.len()
                    }
                };
                if len > MAX_EVENT_BYTES {
                    warn!("telemetry: dropping event with {len} bytes of data");
                    self.drop_event();
                }
            }
            "id" if !value.contains('\0') => self.last_id = Some(value.to_owned()),
            "retry" => {
                if let Ok(ms) = value.parse::<u64>() {
                    return Some(SseFrame::Retry(Duration::from_millis(ms)));
                }
            }
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        let data = self.data.take()?;
        Some(SseFrame::Event(SseEvent {
            event: event.filter(|e| !e.is_empty()).unwrap_or_else(|| DEFAULT_EVENT.to_owned()),
            data,
            id: self.last_id.clone(),
        }))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
