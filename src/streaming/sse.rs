//! SSE framing (bytes -> JSON values).
//!
//! - frames are separated by a blank line
//! - `data:` lines of a frame are joined with `\n`; `event:`, `id:` and `retry:` lines are ignored
//! - `:` comment lines are ignored
//! - the `[DONE]` sentinel ends the stream
//! - frames whose data is not JSON are skipped

use crate::{BoxStream, Result};
use bytes::{Buf, Bytes, BytesMut};
use futures::{stream, StreamExt};
use serde_json::Value;
use std::collections::VecDeque;
use tracing::debug;

pub const DEFAULT_DONE_SIGNAL: &str = "[DONE]";

/// Incremental frame parser. Bytes are buffered until a full frame is available,
/// so multi-byte characters split across chunks survive intact.
#[derive(Debug)]
pub struct SseParser {
    buf: BytesMut,
    done_signal: String,
    done: bool,
}

impl Default for SseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SseParser {
    pub fn new() -> Self {
        Self::with_done_signal(DEFAULT_DONE_SIGNAL)
    }

    pub fn with_done_signal(done_signal: impl Into<String>) -> Self {
        Self {
            buf: BytesMut::new(),
            done_signal: done_signal.into(),
            done: false,
        }
    }

    /// True once the done sentinel has been seen; later input is ignored.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed a chunk, returning every complete JSON frame it finished.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Value> {
        if self.done {
            return Vec::new();
        }
        // CR only ever appears as part of a line terminator on the wire.
        self.buf.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut out = Vec::new();
        while let Some(idx) = find_frame_end(&self.buf) {
            let frame = self.buf.split_to(idx);
            self.buf.advance(2);
            if let Some(v) = self.parse_frame(&frame) {
                out.push(v);
            }
            if self.done {
                self.buf.clear();
                break;
            }
        }
        out
    }

    /// Flush whatever is left once the connection has closed.
    pub fn finish(&mut self) -> Option<Value> {
        if self.done || self.buf.is_empty() {
            return None;
        }
        let frame = std::mem::take(&mut self.buf);
        self.parse_frame(&frame)
    }

    fn parse_frame(&mut self, frame: &[u8]) -> Option<Value> {
        let text = String::from_utf8_lossy(frame);
        let mut data_lines: Vec<&str> = Vec::new();
        for line in text.lines() {
            if line.starts_with(':') {
                continue;
            }
            if let Some(rest) = line.strip_prefix("data:") {
                data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
            }
        }
        // Bare JSON frames without a field name are accepted too.
        let payload = if data_lines.is_empty() {
            text.trim().to_string()
        } else {
            data_lines.join("\n")
        };
        let payload = payload.trim();

        if payload.is_empty() {
            return None;
        }
        if payload == self.done_signal {
            self.done = true;
            return None;
        }
        match serde_json::from_str(payload) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!(error = %e, frame_len = payload.len(), "skipping non-JSON SSE frame");
                None
            }
        }
    }
}

fn find_frame_end(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}

/// Turns a response byte stream into a stream of JSON frames.
#[derive(Debug, Clone)]
pub struct SseDecoder {
    done_signal: String,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self {
            done_signal: DEFAULT_DONE_SIGNAL.to_string(),
        }
    }

    pub fn with_done_signal(done_signal: impl Into<String>) -> Self {
        Self {
            done_signal: done_signal.into(),
        }
    }

    pub fn decode_stream(&self, input: BoxStream<'static, Bytes>) -> BoxStream<'static, Value> {
        let parser = SseParser::with_done_signal(self.done_signal.clone());
        let state = (input, parser, VecDeque::<Value>::new(), false);

        let stream = stream::unfold(state, |(mut input, mut parser, mut pending, mut eof)| async move {
            loop {
                if let Some(v) = pending.pop_front() {
                    return Some((Ok(v), (input, parser, pending, eof)));
                }
                if eof || parser.is_done() {
                    return None;
                }
                match input.next().await {
                    Some(Ok(chunk)) => pending.extend(parser.push(&chunk)),
                    Some(Err(e)) => {
                        eof = true;
                        return Some((Err(e), (input, parser, pending, eof)));
                    }
                    None => {
                        eof = true;
                        pending.extend(parser.finish());
                    }
                }
            }
        });

        Box::pin(stream)
    }
}
