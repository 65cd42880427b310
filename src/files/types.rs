//! File records.

use crate::types::ApiObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn file_object() -> String {
    "file".to_string()
}

/// A document stored on the provider side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub id: String,
    #[serde(default = "file_object")]
    pub object: String,
    pub bytes: u64,
    pub created_at: i64,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub filename: String,
    pub purpose: String,
    /// Deprecated upstream.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_details: Option<String>,
    #[serde(skip)]
    pub raw: Value,
}

impl ApiObject for File {
    fn attach_raw(&mut self, raw: Value) {
        self.raw = raw;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDeleted {
    pub id: String,
    #[serde(default = "file_object")]
    pub object: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(skip)]
    pub raw: Value,
}

impl ApiObject for FileDeleted {
    fn attach_raw(&mut self, raw: Value) {
        self.raw = raw;
    }
}

/// Expiration policy, e.g. `{"anchor": "created_at", "seconds": 3600}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiresAfter {
    pub anchor: String,
    pub seconds: u64,
}

impl ExpiresAfter {
    pub fn created_at(seconds: u64) -> Self {
        Self {
            anchor: "created_at".to_string(),
            seconds,
        }
    }

    /// Multipart form encoding: `expires_after[anchor]`, `expires_after[seconds]`.
    pub fn form_fields(&self) -> [(String, String); 2] {
        [
            ("expires_after[anchor]".to_string(), self.anchor.clone()),
            ("expires_after[seconds]".to_string(), self.seconds.to_string()),
        ]
    }
}

/// Options for a single-request file upload.
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub purpose: String,
    pub filename: Option<String>,
    pub mime_type: Option<String>,
    pub expires_after: Option<ExpiresAfter>,
}

impl FileUpload {
    pub fn new(purpose: impl Into<String>) -> Self {
        Self {
            purpose: purpose.into(),
            filename: None,
            mime_type: None,
            expires_after: None,
        }
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn expires_after(mut self, policy: ExpiresAfter) -> Self {
        self.expires_after = Some(policy);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilesParams {
    pub after: Option<String>,
    pub limit: Option<u32>,
    pub order: Option<String>,
    pub purpose: Option<String>,
}
