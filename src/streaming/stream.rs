//! Event streams and consumer-side aggregation.

use super::event::StreamEvent;
use super::event_types as et;
use super::sse::SseDecoder;
use crate::responses::ResponseObject;
use crate::types::ApiObject;
use crate::{BoxStream, Result};
use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::{debug, warn};

/// Stream of decoded events for one response.
///
/// Ends after the first terminal event (completed, failed, incomplete, error)
/// or when the underlying connection closes, whichever comes first. A transport
/// error is yielded once and ends the stream.
pub struct EventStream {
    inner: BoxStream<'static, StreamEvent>,
}

impl EventStream {
    pub fn from_frames(frames: BoxStream<'static, Value>) -> Self {
        let events = stream::unfold((frames, false), |(mut frames, finished)| async move {
            if finished {
                return None;
            }
            match frames.next().await {
                Some(Ok(raw)) => {
                    let event = StreamEvent::decode(raw);
                    let terminal = event.is_terminal();
                    if terminal {
                        debug!(
                            event_type = event.event_type.as_str(),
                            sequence_number = event.sequence_number,
                            "terminal stream event"
                        );
                    }
                    Some((Ok(event), (frames, terminal)))
                }
                Some(Err(e)) => Some((Err(e), (frames, true))),
                None => None,
            }
        });
        Self {
            inner: Box::pin(events),
        }
    }

    /// Decode an SSE response body.
    pub fn from_bytes(body: BoxStream<'static, Bytes>) -> Self {
        Self::from_frames(SseDecoder::new().decode_stream(body))
    }

    /// Drain the stream into a [`StreamAccumulator`].
    pub async fn accumulate(mut self) -> Result<StreamAccumulator> {
        let mut acc = StreamAccumulator::new();
        while let Some(event) = self.next().await {
            acc.push(&event?);
        }
        Ok(acc)
    }
}

impl Stream for EventStream {
    type Item = Result<StreamEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

/// Folds events into the pieces most consumers want: output text, refusals,
/// function-call arguments, the last response snapshot and any error.
///
/// `sequence_number` is treated as a hint: gaps and reordering are counted and
/// logged, never rejected.
#[derive(Debug, Clone, Default)]
pub struct StreamAccumulator {
    output_text: String,
    refusal: String,
    reasoning_summary: String,
    arguments: BTreeMap<String, String>,
    response: Option<Map<String, Value>>,
    error: Option<StreamEvent>,
    terminal_type: Option<String>,
    last_sequence: Option<u64>,
    sequence_gaps: u64,
    out_of_order: u64,
    events: usize,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: &StreamEvent) {
        self.events += 1;
        self.track_sequence(event);

        match event.event_type.as_str() {
            et::OUTPUT_TEXT_DELTA => push_opt(&mut self.output_text, &event.delta),
            et::REFUSAL_DELTA => push_opt(&mut self.refusal, &event.delta),
            et::REASONING_SUMMARY_TEXT_DELTA => push_opt(&mut self.reasoning_summary, &event.delta),
            et::FUNCTION_CALL_ARGUMENTS_DELTA => {
                if let (Some(item), Some(delta)) = (&event.item_id, &event.delta) {
                    self.arguments.entry(item.clone()).or_default().push_str(delta);
                }
            }
            et::FUNCTION_CALL_ARGUMENTS_DONE => {
                if let (Some(item), Some(args)) = (&event.item_id, &event.arguments) {
                    self.arguments.insert(item.clone(), args.clone());
                }
            }
            _ => {}
        }

        if let Some(snapshot) = &event.response {
            self.response = Some(snapshot.clone());
        }
        if event.is_error() {
            self.error = Some(event.clone());
        }
        if event.is_terminal() {
            self.terminal_type = Some(event.event_type.clone());
        }
    }

    fn track_sequence(&mut self, event: &StreamEvent) {
        let Some(seq) = event.sequence_number else {
            return;
        };
        if let Some(last) = self.last_sequence {
            if seq <= last {
                self.out_of_order = self.out_of_order.saturating_add(1);
                warn!(last, seq, "stream event arrived out of order");
                return;
            }
            let missing = seq - last - 1;
            if missing > 0 {
                self.sequence_gaps = self.sequence_gaps.saturating_add(missing);
                warn!(last, seq, missing, "gap in stream sequence numbers");
            }
        }
        self.last_sequence = Some(seq);
    }

    pub fn output_text(&self) -> &str {
        &self.output_text
    }

    pub fn refusal(&self) -> Option<&str> {
        (!self.refusal.is_empty()).then_some(self.refusal.as_str())
    }

    pub fn reasoning_summary(&self) -> Option<&str> {
        (!self.reasoning_summary.is_empty()).then_some(self.reasoning_summary.as_str())
    }

    /// Function-call arguments keyed by output item id.
    pub fn function_arguments(&self) -> &BTreeMap<String, String> {
        &self.arguments
    }

    /// Latest response snapshot seen on a lifecycle event.
    pub fn response(&self) -> Option<ResponseObject> {
        let snapshot = self.response.clone()?;
        ResponseObject::from_value(Value::Object(snapshot)).ok()
    }

    pub fn error(&self) -> Option<&StreamEvent> {
        self.error.as_ref()
    }

    pub fn terminal_type(&self) -> Option<&str> {
        self.terminal_type.as_deref()
    }

    pub fn is_finished(&self) -> bool {
        self.terminal_type.is_some()
    }

    pub fn sequence_gaps(&self) -> u64 {
        self.sequence_gaps
    }

    pub fn out_of_order(&self) -> u64 {
        self.out_of_order
    }

    pub fn event_count(&self) -> usize {
        self.events
    }
}

fn push_opt(buf: &mut String, piece: &Option<String>) {
    if let Some(p) = piece {
        buf.push_str(p);
    }
}
