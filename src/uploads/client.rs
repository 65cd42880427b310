use super::source::ByteSource;
use super::types::{
    CompleteUploadRequest, CreateUploadRequest, MultipartUpload, Upload, UploadPart,
    DEFAULT_FILENAME, MAX_PART_SIZE,
};
use crate::files::File;
use crate::transport::{Expect, FormData, QueryParams, RequestBody, Transport};
use crate::types::ApiObject;
use crate::utils::require_id;
use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use futures::stream::{self, TryStreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const UPLOADS_PATH: &str = "/v1/uploads";

/// Chunked upload coordinator.
///
/// The low-level calls map one-to-one onto the endpoints; [`Uploads::multipart_upload`]
/// drives the whole create / add parts / complete sequence for a single source.
#[derive(Clone)]
pub struct Uploads {
    transport: Arc<dyn Transport>,
}

impl Uploads {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Open an upload session for `request.bytes` bytes.
    pub async fn create(&self, request: &CreateUploadRequest) -> Result<Upload> {
        if request.purpose.trim().is_empty() {
            return Err(Error::validation_with_context(
                "upload purpose must not be empty",
                ErrorContext::new().with_field_path("purpose"),
            ));
        }
        let body = serde_json::to_value(request)?;
        let value = self.transport.post_json(UPLOADS_PATH, body).await?;
        Upload::from_value(value)
    }

    /// Register one chunk.
    ///
    /// Chunks above 64 MiB are sent as-is and left for the service to refuse;
    /// [`Uploads::multipart_upload`] never produces them.
    pub async fn add_part(&self, upload_id: &str, data: Bytes) -> Result<UploadPart> {
        let id = require_id("upload_id", upload_id)?;
        if data.len() > MAX_PART_SIZE {
            warn!(upload_id = id, bytes = data.len(), max = MAX_PART_SIZE, "part exceeds size ceiling");
        }
        let form = FormData::new().file("data", "part", "application/octet-stream", data);
        let value = self
            .transport
            .post(
                &format!("{}/{}/parts", UPLOADS_PATH, id),
                RequestBody::Form(form),
                &QueryParams::new(),
                Expect::Json,
            )
            .await?
            .into_json()?;
        UploadPart::from_value(value)
    }

    /// Finish the upload. `part_ids` order defines the byte order of the resulting file.
    pub async fn complete(
        &self,
        upload_id: &str,
        part_ids: &[String],
        md5: Option<&str>,
    ) -> Result<Upload> {
        let id = require_id("upload_id", upload_id)?;
        let body = serde_json::to_value(CompleteUploadRequest { part_ids, md5 })?;
        let value = self
            .transport
            .post_json(&format!("{}/{}/complete", UPLOADS_PATH, id), body)
            .await?;
        Upload::from_value(value)
    }

    /// Cancel the upload. No parts are accepted afterwards.
    pub async fn cancel(&self, upload_id: &str) -> Result<Upload> {
        let id = require_id("upload_id", upload_id)?;
        let value = self
            .transport
            .post_empty(&format!("{}/{}/cancel", UPLOADS_PATH, id))
            .await?;
        Upload::from_value(value)
    }

    /// Upload `source` in chunks and return the assembled file.
    ///
    /// A failed part aborts the run and leaves the upload pending on the server;
    /// it is not cancelled. Cancelling through `options.cancellation` cancels the
    /// upload remotely and returns [`Error::Cancelled`].
    pub async fn multipart_upload(
        &self,
        source: ByteSource,
        options: MultipartUpload,
    ) -> Result<File> {
        let part_size = effective_part_size(options.part_size)?;
        let concurrency = options.concurrency.max(1);
        let token = options.cancellation.clone();

        let opened = source.open().await?;
        let declared = opened.size();
        let filename = options
            .filename
            .clone()
            .or_else(|| opened.name().map(String::from))
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string());

        if is_cancelled(&token) {
            return Err(Error::cancelled("upload cancelled before it was created"));
        }

        let mut request = CreateUploadRequest::new(
            declared,
            filename.as_str(),
            options.mime_type.as_str(),
            options.purpose.as_str(),
        );
        request.expires_after = options.expires_after.clone();

        let start = Instant::now();
        let upload = self.create(&request).await?;
        let upload_id = upload.id.as_str();
        info!(
            upload_id,
            filename = filename.as_str(),
            bytes = declared,
            part_size,
            concurrency,
            "upload created"
        );

        let chunks = stream::try_unfold((opened, 0usize), move |(mut src, index)| async move {
            match src.read_chunk(part_size).await? {
                Some(chunk) => Ok::<_, Error>(Some(((index, chunk), (src, index + 1)))),
                None => Ok(None),
            }
        });

        let sent: Result<Vec<(usize, String, usize)>> = chunks
            .map_ok(|(index, chunk)| {
                let token = token.clone();
                async move {
                    if is_cancelled(&token) {
                        return Err(Error::cancelled("upload cancelled between parts"));
                    }
                    let len = chunk.len();
                    let part = self.add_part(upload_id, chunk).await?;
                    debug!(upload_id, part_id = part.id.as_str(), index, bytes = len, "part added");
                    Ok((index, part.id, len))
                }
            })
            .try_buffer_unordered(concurrency)
            .try_collect()
            .await;

        let mut sent = match sent {
            Ok(parts) => parts,
            Err(Error::Cancelled { message }) => {
                self.abandon(upload_id).await;
                return Err(Error::Cancelled { message });
            }
            Err(e) => {
                warn!(upload_id, error = %e, "upload aborted; session left pending");
                return Err(e);
            }
        };

        sent.sort_by_key(|(index, _, _)| *index);
        let total: u64 = sent.iter().map(|(_, _, len)| *len as u64).sum();
        if total != declared {
            warn!(upload_id, declared, read = total, "source size changed while uploading");
        }
        let part_ids: Vec<String> = sent.into_iter().map(|(_, id, _)| id).collect();

        if is_cancelled(&token) {
            self.abandon(upload_id).await;
            return Err(Error::cancelled("upload cancelled before completion"));
        }

        let completed = self
            .complete(upload_id, &part_ids, options.md5.as_deref())
            .await?;
        let file = completed.file.ok_or_else(|| {
            Error::protocol_with_context(
                format!("upload {} completed without a file", completed.id),
                ErrorContext::new()
                    .with_source("uploads")
                    .with_details(format!("status: {:?}", completed.status)),
            )
        })?;

        info!(
            upload_id,
            file_id = file.id.as_str(),
            parts = part_ids.len(),
            bytes = total,
            duration_ms = start.elapsed().as_millis() as u64,
            "upload completed"
        );
        Ok(file)
    }

    /// Best-effort remote cancel after a local cancellation.
    async fn abandon(&self, upload_id: &str) {
        match self.cancel(upload_id).await {
            Ok(upload) => info!(upload_id, status = ?upload.status, "upload cancelled"),
            Err(e) => warn!(upload_id, error = %e, "failed to cancel upload"),
        }
    }
}

fn is_cancelled(token: &Option<CancellationToken>) -> bool {
    token.as_ref().map_or(false, CancellationToken::is_cancelled)
}

fn effective_part_size(requested: usize) -> Result<usize> {
    if requested == 0 {
        return Err(Error::validation_with_context(
            "part size must be greater than zero",
            ErrorContext::new().with_field_path("part_size"),
        ));
    }
    if requested > MAX_PART_SIZE {
        warn!(requested, max = MAX_PART_SIZE, "part size clamped");
        return Ok(MAX_PART_SIZE);
    }
    Ok(requested)
}
