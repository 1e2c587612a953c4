//! Incremental decoder for blank-line-delimited event frames.
//!
//! Network reads arrive in arbitrary chunks. [`FrameDecoder`] keeps the
//! unterminated tail of the buffer between reads and only hands out frames
//! whose terminating blank line has been seen. It knows nothing about
//! transport, so it can be driven from any byte source.

use tracing::{debug, warn};

/// Event type used when a frame carries no `event:` line.
pub const DEFAULT_EVENT: &str = "message";

/// One decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Value of the `event:` line, or [`DEFAULT_EVENT`]
    pub event: String,
    /// `data:` lines joined with `\n`
    pub data: String,
}

/// Buffering frame decoder.
///
/// # Examples
///
/// ```
/// use atelier_client::FrameDecoder;
///
/// let mut decoder = FrameDecoder::new();
/// decoder.push(b"event: progress\ndata: {\"to");
/// assert!(decoder.next_frame().is_none());
///
/// decoder.push(b"tal\": 3}\n\n");
/// let frame = decoder.next_frame().unwrap();
/// assert_eq!(frame.event, "progress");
/// assert_eq!(frame.data, "{\"total\": 3}");
/// ```
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    /// Empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk read from the wire.
    ///
    /// Carriage returns are dropped so CRLF streams frame the same as LF.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend(chunk.iter().copied().filter(|&b| b != b'\r'));
    }

    /// Bytes held back waiting for a terminator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Next complete frame, if one is buffered.
    ///
    /// Frames with no lines at all (runs of blank lines) and frames that
    /// are not valid UTF-8 are skipped.
    pub fn next_frame(&mut self) -> Option<Frame> {
        loop {
            let end = self.buffer.windows(2).position(|w| w == b"\n\n")?;
            let raw: Vec<u8> = self.buffer.drain(..end + 2).take(end).collect();
            let text = match String::from_utf8(raw) {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "Skipping frame with invalid UTF-8");
                    continue;
                }
            };
            if let Some(frame) = parse_frame(&text) {
                return Some(frame);
            }
        }
    }

    /// Drop whatever unterminated data remains at end of stream.
    pub fn finish(&mut self) {
        if !self.buffer.is_empty() {
            debug!(bytes = self.buffer.len(), "Discarding unterminated trailing frame");
            self.buffer.clear();
        }
    }
}

fn parse_frame(text: &str) -> Option<Frame> {
    let mut event = None;
    let mut data: Vec<&str> = Vec::new();
    let mut seen_field = false;

    for line in text.split('\n') {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (tag, value) = match line.split_once(':') {
            Some((tag, value)) => (tag, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        seen_field = true;
        match tag {
            "event" => event = Some(value.to_string()),
            "data" => data.push(value),
            other => debug!(tag = other, "Ignoring unknown frame field"),
        }
    }

    seen_field.then(|| Frame {
        event: event.unwrap_or_else(|| DEFAULT_EVENT.to_string()),
        data: data.join("\n"),
    })
}
