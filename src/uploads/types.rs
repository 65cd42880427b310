//! Upload records and multipart options.

use crate::files::{ExpiresAfter, File};
use crate::types::ApiObject;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Largest chunk accepted by `add_part` (64 MiB).
pub const MAX_PART_SIZE: usize = 64 * 1024 * 1024;

/// Default chunk size for [`MultipartUpload`].
pub const DEFAULT_PART_SIZE: usize = MAX_PART_SIZE;

/// Largest total upload the service accepts (8 GiB). Not enforced client-side.
pub const MAX_UPLOAD_BYTES: u64 = 8 * 1024 * 1024 * 1024;

/// Filename used when neither the caller nor the source provides one.
pub const DEFAULT_FILENAME: &str = "upload.bin";

fn upload_object() -> String {
    "upload".to_string()
}

fn upload_part_object() -> String {
    "upload.part".to_string()
}

/// `null` and `{}` both mean the upload has no file yet.
fn nested_file<'de, D>(deserializer: D) -> std::result::Result<Option<File>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) if map.is_empty() => Ok(None),
        Some(value) => File::deserialize(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Pending,
    Completed,
    Cancelled,
    Expired,
    #[serde(other)]
    Unknown,
}

impl UploadStatus {
    /// No further parts can be added once an upload leaves `pending`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Expired)
    }
}

/// A multipart upload session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upload {
    pub id: String,
    #[serde(default = "upload_object")]
    pub object: String,
    /// Declared total size.
    pub bytes: u64,
    pub created_at: i64,
    pub expires_at: i64,
    pub filename: String,
    pub purpose: String,
    pub status: UploadStatus,
    /// The assembled file, present once the upload has completed.
    #[serde(default, deserialize_with = "nested_file")]
    pub file: Option<File>,
    #[serde(skip)]
    pub raw: Value,
}

impl ApiObject for Upload {
    fn attach_raw(&mut self, raw: Value) {
        if let (Some(file), Some(file_raw)) = (self.file.as_mut(), raw.get("file")) {
            file.attach_raw(file_raw.clone());
        }
        self.raw = raw;
    }
}

/// One chunk registered against an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadPart {
    pub id: String,
    #[serde(default = "upload_part_object")]
    pub object: String,
    pub created_at: i64,
    pub upload_id: String,
    #[serde(skip)]
    pub raw: Value,
}

impl ApiObject for UploadPart {
    fn attach_raw(&mut self, raw: Value) {
        self.raw = raw;
    }
}

/// Body of `POST /v1/uploads`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateUploadRequest {
    pub bytes: u64,
    pub filename: String,
    pub mime_type: String,
    pub purpose: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_after: Option<ExpiresAfter>,
}

impl CreateUploadRequest {
    pub fn new(
        bytes: u64,
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        purpose: impl Into<String>,
    ) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            mime_type: mime_type.into(),
            purpose: purpose.into(),
            expires_after: None,
        }
    }

    pub fn expires_after(mut self, policy: ExpiresAfter) -> Self {
        self.expires_after = Some(policy);
        self
    }
}

/// Body of `POST /v1/uploads/{id}/complete`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CompleteUploadRequest<'a> {
    pub part_ids: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<&'a str>,
}

/// Options for [`crate::uploads::Uploads::multipart_upload`].
#[derive(Debug, Clone)]
pub struct MultipartUpload {
    pub purpose: String,
    pub mime_type: String,
    /// Overrides the name derived from the source.
    pub filename: Option<String>,
    /// Chunk size; clamped to [`MAX_PART_SIZE`], zero is rejected.
    pub part_size: usize,
    pub expires_after: Option<ExpiresAfter>,
    /// Passed through to completion; not verified locally.
    pub md5: Option<String>,
    /// Parts in flight at once. Part order in the completion call is always
    /// the byte order of the source.
    pub concurrency: usize,
    pub cancellation: Option<CancellationToken>,
}

impl MultipartUpload {
    pub fn new(purpose: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            purpose: purpose.into(),
            mime_type: mime_type.into(),
            filename: None,
            part_size: DEFAULT_PART_SIZE,
            expires_after: None,
            md5: None,
            concurrency: 1,
            cancellation: None,
        }
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn part_size(mut self, part_size: usize) -> Self {
        self.part_size = part_size;
        self
    }

    pub fn expires_after(mut self, policy: ExpiresAfter) -> Self {
        self.expires_after = Some(policy);
        self
    }

    pub fn md5(mut self, md5: impl Into<String>) -> Self {
        self.md5 = Some(md5.into());
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}
