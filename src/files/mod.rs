//! Files resource: single-request uploads, listing, retrieval, deletion, content download.

mod client;
mod types;

pub use client::Files;
pub use types::{ExpiresAfter, File, FileDeleted, FileUpload, ListFilesParams};
