use super::types::{File, FileDeleted, FileUpload, ListFilesParams};
use crate::transport::{Expect, FormData, QueryParams, RequestBody, Transport};
use crate::types::{ApiObject, ListPage};
use crate::uploads::{ByteSource, DEFAULT_FILENAME};
use crate::utils::require_id;
use crate::Result;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info};

const FILES_PATH: &str = "/v1/files";
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Files resource.
#[derive(Clone)]
pub struct Files {
    transport: Arc<dyn Transport>,
}

impl Files {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Upload a whole file in one multipart request.
    ///
    /// Suitable for small documents; anything large should go through
    /// [`crate::uploads::Uploads::multipart_upload`].
    pub async fn upload(&self, source: ByteSource, options: FileUpload) -> Result<File> {
        let opened = source.open().await?;
        let filename = options
            .filename
            .or_else(|| opened.name().map(String::from))
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
        let data = opened.read_all().await?;
        let mime_type = options
            .mime_type
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

        let mut form = FormData::new().text("purpose", options.purpose.as_str());
        if let Some(policy) = &options.expires_after {
            for (name, value) in policy.form_fields() {
                form = form.text(name, value);
            }
        }
        let size = data.len();
        form = form.file("file", filename.as_str(), mime_type, data);

        let value = self
            .transport
            .post(FILES_PATH, RequestBody::Form(form), &QueryParams::new(), Expect::Json)
            .await?
            .into_json()?;
        let file = File::from_value(value)?;
        info!(
            file_id = file.id.as_str(),
            filename = filename.as_str(),
            bytes = size,
            purpose = options.purpose.as_str(),
            "file uploaded"
        );
        Ok(file)
    }

    /// One page of files matching `params`.
    pub async fn list(&self, params: &ListFilesParams) -> Result<ListPage<File>> {
        let mut query = QueryParams::new();
        query
            .push_opt("after", params.after.as_deref())
            .push_opt("limit", params.limit)
            .push_opt("order", params.order.as_deref())
            .push_opt("purpose", params.purpose.as_deref());
        let value = self.transport.get_json(FILES_PATH, &query).await?;
        let page = ListPage::from_value(value)?;
        debug!(count = page.len(), has_more = page.has_more, "listed files");
        Ok(page)
    }

    /// File metadata by id.
    pub async fn retrieve(&self, file_id: &str) -> Result<File> {
        let id = require_id("file_id", file_id)?;
        let value = self
            .transport
            .get_json(&format!("{}/{}", FILES_PATH, id), &QueryParams::new())
            .await?;
        File::from_value(value)
    }

    /// Delete a file.
    pub async fn delete(&self, file_id: &str) -> Result<FileDeleted> {
        let id = require_id("file_id", file_id)?;
        let value = self
            .transport
            .delete(&format!("{}/{}", FILES_PATH, id), &QueryParams::new())
            .await?;
        FileDeleted::from_value(value)
    }

    /// Raw file contents.
    pub async fn content(&self, file_id: &str) -> Result<Bytes> {
        let id = require_id("file_id", file_id)?;
        self.transport
            .get(
                &format!("{}/{}/content", FILES_PATH, id),
                &QueryParams::new(),
                Expect::Bytes,
            )
            .await?
            .into_bytes()
    }
}
