//! Response records and request bodies.

use crate::types::ApiObject;
use crate::utils::merge_extra;
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Token accounting attached to a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub input_tokens_details: Option<Value>,
    #[serde(default)]
    pub output_tokens_details: Option<Value>,
}

/// A usage block of the wrong shape reads as absent.
fn lenient_usage<'de, D>(deserializer: D) -> std::result::Result<Option<ResponseUsage>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Minimal typed view of a response. Everything else lives in `raw`.
///
/// Snapshots embedded in stream events may be partial, so every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseObject {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub output: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_usage")]
    pub usage: Option<ResponseUsage>,
    #[serde(skip)]
    pub raw: Value,
}

impl ResponseObject {
    /// Concatenated `output_text` parts of every message in `output`.
    pub fn output_text(&self) -> String {
        self.output
            .iter()
            .filter(|item| item.get("type").and_then(Value::as_str) == Some("message"))
            .filter_map(|item| item.get("content").and_then(Value::as_array))
            .flatten()
            .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect()
    }
}

impl ApiObject for ResponseObject {
    fn attach_raw(&mut self, raw: Value) {
        self.raw = raw;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseDeleted {
    pub id: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(skip)]
    pub raw: Value,
}

impl ApiObject for ResponseDeleted {
    fn attach_raw(&mut self, raw: Value) {
        self.raw = raw;
    }
}

/// One input item (message, file reference, tool output, ...). Shape varies by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputItem {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub item_type: String,
    #[serde(skip)]
    pub raw: Value,
}

impl ApiObject for InputItem {
    fn attach_raw(&mut self, raw: Value) {
        self.raw = raw;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputTokenCount {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(skip)]
    pub raw: Value,
}

impl ApiObject for InputTokenCount {
    fn attach_raw(&mut self, raw: Value) {
        self.raw = raw;
    }
}

/// Body of `POST /v1/responses`.
///
/// The common parameters are named; anything else (`reasoning`, `text`,
/// `include`, `service_tier`, ...) goes through [`CreateResponseRequest::extra`].
/// A named field always wins over an extra field with the same key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateResponseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(skip)]
    pub extra: Map<String, Value>,
}

impl CreateResponseRequest {
    /// `input` may be a plain string or a list of input items.
    pub fn new(model: impl Into<String>, input: impl Into<Value>) -> Self {
        Self {
            model: Some(model.into()),
            input: Some(input.into()),
            ..Default::default()
        }
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn previous_response_id(mut self, id: impl Into<String>) -> Self {
        self.previous_response_id = Some(id.into());
        self
    }

    pub fn max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn background(mut self, background: bool) -> Self {
        self.background = Some(background);
        self
    }

    /// Set a body field that has no named counterpart.
    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn to_body(&self) -> Result<Value> {
        to_object_body(self, &self.extra)
    }
}

/// Body of `POST /v1/responses/input_tokens`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InputTokensRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
    #[serde(skip)]
    pub extra: Map<String, Value>,
}

impl InputTokensRequest {
    pub fn new(model: impl Into<String>, input: impl Into<Value>) -> Self {
        Self {
            model: Some(model.into()),
            input: Some(input.into()),
            ..Default::default()
        }
    }

    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn to_body(&self) -> Result<Value> {
        to_object_body(self, &self.extra)
    }
}

fn to_object_body<T: Serialize>(named: &T, extra: &Map<String, Value>) -> Result<Value> {
    match serde_json::to_value(named)? {
        Value::Object(mut body) => {
            merge_extra(&mut body, extra);
            Ok(Value::Object(body))
        }
        other => Err(Error::protocol(format!(
            "request body serialized to a non-object: {}",
            other
        ))),
    }
}

/// Query for `GET /v1/responses/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrieveResponseParams {
    pub include: Vec<String>,
    pub include_obfuscation: Option<bool>,
    pub starting_after: Option<u64>,
}

/// Query for `GET /v1/responses/{id}/input_items`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListInputItemsParams {
    pub after: Option<String>,
    pub include: Vec<String>,
    pub limit: Option<u32>,
    pub order: Option<String>,
}
