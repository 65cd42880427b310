//! Response streaming: event registry, decoder, SSE framing and event streams.
//!
//! ```text
//! HTTP bytes → SseDecoder → JSON frames → StreamEvent::decode → EventStream
//!                                                            └→ StreamAccumulator (optional)
//! ```
//!
//! | Item | Description |
//! |------|-------------|
//! | [`event_types`] | Every registered discriminator, grouped by subsystem |
//! | [`StreamEvent`] | Total decoder over one raw event object |
//! | [`SseDecoder`] | Incremental SSE framing |
//! | [`EventStream`] | Decoded events, ending at the first terminal event |
//! | [`StreamAccumulator`] | Consumer-side aggregation of a finished stream |
//!
//! ```rust
//! use merlin::streaming::StreamEvent;
//! use serde_json::json;
//!
//! let ev = StreamEvent::decode(json!({"type": "response.output_text.delta", "delta": "Hi"}));
//! assert_eq!(ev.delta.as_deref(), Some("Hi"));
//! assert!(!ev.is_terminal());
//! ```

mod event;
pub mod event_types;
mod sse;
mod stream;

pub use event::StreamEvent;
pub use event_types::EventGroup;
pub use sse::{SseDecoder, SseParser, DEFAULT_DONE_SIGNAL};
pub use stream::{EventStream, StreamAccumulator};

/// Decode one raw event object.
pub fn parse_stream_event(raw: serde_json::Value) -> StreamEvent {
    StreamEvent::decode(raw)
}
