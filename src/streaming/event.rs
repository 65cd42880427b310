//! Decoded view over one streaming event.

use super::event_types::{self, EventGroup};
use crate::responses::ResponseObject;
use crate::types::ApiObject;
use crate::utils::JsonObjectExt;
use base64::Engine;
use serde::Serialize;
use serde_json::{Map, Value};

type JsonObject = Map<String, Value>;

/// One server-sent event from a response stream.
///
/// The common fields are surfaced as options; which of them are populated depends
/// on `event_type`. Anything more specialised lives in `raw`, which always holds
/// the untouched input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub sequence_number: Option<u64>,

    /// Full response snapshot on lifecycle events.
    pub response: Option<JsonObject>,

    pub item_id: Option<String>,
    pub output_index: Option<u32>,
    pub content_index: Option<u32>,
    pub summary_index: Option<u32>,

    pub delta: Option<String>,
    pub text: Option<String>,
    pub refusal: Option<String>,
    pub arguments: Option<String>,
    pub code: Option<String>,

    pub partial_image_b64: Option<String>,
    pub partial_image_index: Option<u32>,

    pub annotation: Option<JsonObject>,
    pub annotation_index: Option<u32>,
    pub logprobs: Option<Vec<Value>>,

    /// Only ever set when `event_type == "error"`.
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub error_param: Option<String>,

    pub raw: Value,
}

impl StreamEvent {
    /// Decode a raw event. Never fails: absent or mistyped fields read as `None`,
    /// and a non-object input yields an event with an empty type.
    pub fn decode(raw: Value) -> Self {
        let empty = JsonObject::new();
        let obj = raw.as_object().unwrap_or(&empty);

        let event_type = obj.opt_str("type").unwrap_or_default();
        let is_error = event_type == event_types::ERROR;

        // `code`/`message`/`param` mean something else on non-error events.
        let (error_code, error_message, error_param) = if is_error {
            (obj.opt_str("code"), obj.opt_str("message"), obj.opt_str("param"))
        } else {
            (None, None, None)
        };

        Self {
            sequence_number: obj.opt_u64("sequence_number"),
            response: obj.opt_object("response"),
            item_id: obj.opt_str("item_id"),
            output_index: obj.opt_u32("output_index"),
            content_index: obj.opt_u32("content_index"),
            summary_index: obj.opt_u32("summary_index"),
            delta: obj.opt_str("delta"),
            text: obj.opt_str("text"),
            refusal: obj.opt_str("refusal"),
            arguments: obj.opt_str("arguments"),
            code: obj.opt_str("code"),
            partial_image_b64: obj.opt_str("partial_image_b64"),
            partial_image_index: obj.opt_u32("partial_image_index"),
            annotation: obj.opt_object("annotation"),
            annotation_index: obj.opt_u32("annotation_index"),
            logprobs: obj.opt_array("logprobs"),
            error_code,
            error_message,
            error_param,
            event_type,
            raw,
        }
    }

    pub fn is_error(&self) -> bool {
        self.event_type == event_types::ERROR
    }

    /// True for completed / failed / incomplete / error.
    pub fn is_terminal(&self) -> bool {
        event_types::is_terminal(&self.event_type)
    }

    pub fn group(&self) -> EventGroup {
        event_types::group_of(&self.event_type)
    }

    pub fn is_known(&self) -> bool {
        self.group() != EventGroup::Unknown
    }

    /// Decoded bytes of a partial image, when present and valid base64.
    pub fn partial_image_bytes(&self) -> Option<Vec<u8>> {
        let b64 = self.partial_image_b64.as_deref()?;
        base64::engine::general_purpose::STANDARD.decode(b64).ok()
    }

    /// Typed view of the lifecycle snapshot, if the event carries one that decodes.
    pub fn response_object(&self) -> Option<ResponseObject> {
        let snapshot = self.response.clone()?;
        ResponseObject::from_value(Value::Object(snapshot)).ok()
    }
}

impl From<Value> for StreamEvent {
    fn from(raw: Value) -> Self {
        Self::decode(raw)
    }
}
