//! Transport seam: everything the resource modules need from HTTP.
//!
//! Resource code (uploads, files, responses) only ever talks to a [`Transport`].
//! [`HttpTransport`] is the reqwest-backed implementation; tests substitute
//! in-process doubles.

mod http;

pub use http::HttpTransport;

use crate::{BoxStream, Error, Result};
use bytes::Bytes;
use serde_json::Value;

/// Which kind of body the caller expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Json,
    Bytes,
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Bytes(Bytes),
}

impl Payload {
    pub fn into_json(self) -> Result<Value> {
        match self {
            Payload::Json(v) => Ok(v),
            Payload::Bytes(b) => Ok(serde_json::from_slice(&b)?),
        }
    }

    pub fn into_bytes(self) -> Result<Bytes> {
        match self {
            Payload::Bytes(b) => Ok(b),
            Payload::Json(_) => Err(Error::protocol(
                "expected a binary body but the transport returned JSON",
            )),
        }
    }
}

/// Ordered query parameters. Repeated keys are allowed (`include=a&include=b`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.0.push((key.into(), value.to_string()));
        self
    }

    pub fn push_opt<V: ToString>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.push(key, v);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A file attached to a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormFile {
    pub field: String,
    pub filename: String,
    pub mime_type: String,
    pub data: Bytes,
}

/// Multipart form body: text fields plus file parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FormFile>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(
        mut self,
        field: impl Into<String>,
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        data: Bytes,
    ) -> Self {
        self.files.push(FormFile {
            field: field.into(),
            filename: filename.into(),
            mime_type: mime_type.into(),
            data,
        });
        self
    }

    /// Total size of all attached file parts.
    pub fn file_bytes(&self) -> usize {
        self.files.iter().map(|f| f.data.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Form(FormData),
}

/// Minimal HTTP capability consumed by every resource.
///
/// Implementations must turn any non-2xx reply into an error; callers never
/// inspect status codes themselves.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, query: &QueryParams, expect: Expect) -> Result<Payload>;

    async fn post(
        &self,
        path: &str,
        body: RequestBody,
        query: &QueryParams,
        expect: Expect,
    ) -> Result<Payload>;

    async fn delete(&self, path: &str, query: &QueryParams) -> Result<Value>;

    /// POST a JSON body and hand back the raw response byte stream (SSE).
    async fn post_stream(&self, path: &str, body: Value) -> Result<BoxStream<'static, Bytes>>;

    async fn get_json(&self, path: &str, query: &QueryParams) -> Result<Value> {
        self.get(path, query, Expect::Json).await?.into_json()
    }

    async fn post_json(&self, path: &str, body: Value) -> Result<Value> {
        self.post(path, RequestBody::Json(body), &QueryParams::new(), Expect::Json)
            .await?
            .into_json()
    }

    async fn post_empty(&self, path: &str) -> Result<Value> {
        self.post(path, RequestBody::Empty, &QueryParams::new(), Expect::Json)
            .await?
            .into_json()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Transport error: {0}")]
    Other(String),
}
