//! Chunked uploads: one session, many parts, an ordered completion.
//!
//! ```text
//! create (bytes, filename, mime_type, purpose) ─→ pending
//!   add_part × N   (≤ 64 MiB each, any order)
//!   complete(part_ids in byte order, md5?)    ─→ completed + file
//!   cancel                                    ─→ cancelled
//! ```

mod client;
mod source;
mod types;

pub use client::Uploads;
pub use source::{ByteSource, OpenedSource};
pub use types::{
    CreateUploadRequest, MultipartUpload, Upload, UploadPart, UploadStatus, DEFAULT_FILENAME,
    DEFAULT_PART_SIZE, MAX_PART_SIZE, MAX_UPLOAD_BYTES,
};
