//! In-process `Transport` double that simulates the upload endpoints and records every call.

use async_trait::async_trait;
use bytes::Bytes;
use merlin::transport::{Expect, Payload, QueryParams, RequestBody, Transport};
use merlin::{BoxStream, Error, Result};
use serde_json::{json, Value};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// One recorded request. File parts are summarised, not kept.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateUpload(Value),
    AddPart {
        upload_id: String,
        len: usize,
        first_byte: Option<u8>,
    },
    Complete {
        upload_id: String,
        body: Value,
    },
    Cancel {
        upload_id: String,
    },
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    declared_bytes: u64,
    filename: String,
    purpose: String,
    parts_seen: usize,
}

#[derive(Default)]
pub struct FakeUploadApi {
    state: Mutex<State>,
    fail_part: Option<usize>,
    complete_without_file: bool,
    complete_with_empty_file: bool,
    slow_first_parts: bool,
    cancel_after_parts: Option<(usize, CancellationToken)>,
}

impl FakeUploadApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// The n-th part request (1-based) answers HTTP 500.
    pub fn failing_part(mut self, n: usize) -> Self {
        self.fail_part = Some(n);
        self
    }

    pub fn completing_without_file(mut self) -> Self {
        self.complete_without_file = true;
        self
    }

    /// Completion answers with `"file": {}`.
    pub fn completing_with_empty_file(mut self) -> Self {
        self.complete_with_empty_file = true;
        self
    }

    /// Earlier parts take longer, so completion order is the reverse of byte order.
    pub fn slow_first_parts(mut self) -> Self {
        self.slow_first_parts = true;
        self
    }

    /// Trip `token` once `n` parts have been accepted.
    pub fn cancelling_after(mut self, n: usize, token: CancellationToken) -> Self {
        self.cancel_after_parts = Some((n, token));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn part_calls(&self) -> Vec<(usize, Option<u8>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::AddPart { len, first_byte, .. } => Some((len, first_byte)),
                _ => None,
            })
            .collect()
    }

    pub fn completed_part_ids(&self) -> Option<Vec<String>> {
        self.calls().into_iter().find_map(|c| match c {
            Call::Complete { body, .. } => Some(
                body["part_ids"]
                    .as_array()?
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect(),
            ),
            _ => None,
        })
    }

    fn upload_json(&self, status: &str, with_file: bool) -> Value {
        let state = self.state.lock().unwrap();
        let file = if with_file && self.complete_with_empty_file {
            json!({})
        } else if with_file {
            json!({
                "id": "file-abc",
                "object": "file",
                "bytes": state.declared_bytes,
                "created_at": 1719184911,
                "filename": state.filename,
                "purpose": state.purpose
            })
        } else {
            Value::Null
        };
        json!({
            "id": "upload_abc",
            "object": "upload",
            "bytes": state.declared_bytes,
            "created_at": 1719184911,
            "expires_at": 1719188511,
            "filename": state.filename,
            "purpose": state.purpose,
            "status": status,
            "file": file
        })
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

fn upload_id_of(path: &str) -> String {
    path.trim_start_matches("/v1/uploads/")
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl Transport for FakeUploadApi {
    async fn get(&self, path: &str, _query: &QueryParams, _expect: Expect) -> Result<Payload> {
        Err(Error::protocol(format!("unexpected GET {}", path)))
    }

    async fn post(
        &self,
        path: &str,
        body: RequestBody,
        _query: &QueryParams,
        _expect: Expect,
    ) -> Result<Payload> {
        match (path, body) {
            ("/v1/uploads", RequestBody::Json(body)) => {
                {
                    let mut state = self.state.lock().unwrap();
                    state.declared_bytes = body["bytes"].as_u64().unwrap_or_default();
                    state.filename = body["filename"].as_str().unwrap_or_default().to_string();
                    state.purpose = body["purpose"].as_str().unwrap_or_default().to_string();
                }
                self.record(Call::CreateUpload(body));
                Ok(Payload::Json(self.upload_json("pending", false)))
            }
            (p, RequestBody::Form(form)) if p.ends_with("/parts") => {
                let upload_id = upload_id_of(p);
                let data = form
                    .files
                    .iter()
                    .find(|f| f.field == "data")
                    .map(|f| f.data.clone())
                    .unwrap_or_default();
                let first_byte = data.first().copied();
                let n = {
                    let mut state = self.state.lock().unwrap();
                    state.parts_seen += 1;
                    state.parts_seen
                };
                if self.slow_first_parts {
                    let wait = 40u64.saturating_sub(10 * u64::from(first_byte.unwrap_or(0)));
                    tokio::time::sleep(Duration::from_millis(wait)).await;
                }
                self.record(Call::AddPart {
                    upload_id: upload_id.clone(),
                    len: data.len(),
                    first_byte,
                });
                if self.fail_part == Some(n) {
                    return Err(Error::Remote {
                        status: 500,
                        code: Some("server_error".into()),
                        message: "part rejected".into(),
                        request_id: None,
                    });
                }
                if let Some((after, token)) = &self.cancel_after_parts {
                    if n >= *after {
                        token.cancel();
                    }
                }
                Ok(Payload::Json(json!({
                    "id": format!("part_{}", first_byte.unwrap_or(0)),
                    "object": "upload.part",
                    "created_at": 1719185911,
                    "upload_id": upload_id
                })))
            }
            (p, RequestBody::Json(body)) if p.ends_with("/complete") => {
                self.record(Call::Complete {
                    upload_id: upload_id_of(p),
                    body,
                });
                Ok(Payload::Json(
                    self.upload_json("completed", !self.complete_without_file),
                ))
            }
            (p, RequestBody::Empty) if p.ends_with("/cancel") => {
                self.record(Call::Cancel {
                    upload_id: upload_id_of(p),
                });
                Ok(Payload::Json(self.upload_json("cancelled", false)))
            }
            (p, _) => Err(Error::protocol(format!("unexpected POST {}", p))),
        }
    }

    async fn delete(&self, path: &str, _query: &QueryParams) -> Result<Value> {
        Err(Error::protocol(format!("unexpected DELETE {}", path)))
    }

    async fn post_stream(&self, path: &str, _body: Value) -> Result<BoxStream<'static, Bytes>> {
        Err(Error::protocol(format!("unexpected stream {}", path)))
    }
}
