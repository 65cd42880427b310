//! # merlin
//!
//! Typed async client for a generative-AI REST and server-sent-events API.
//!
//! ## Overview
//!
//! The crate covers the parts of the API where the wire protocol carries real
//! logic:
//!
//! - **Streaming**: response streams are decoded frame by frame into
//!   [`StreamEvent`]s. Decoding is total: unknown event types and missing
//!   fields never fail, and the raw JSON is always kept.
//! - **Uploads**: large files are sent as ordered parts of at most 64 MiB
//!   through [`Uploads::multipart_upload`], which creates the session, sends
//!   the parts, completes it in byte order and returns the resulting [`File`].
//! - **Pagination**: every list endpoint returns a [`ListPage`].
//!
//! Files and Responses CRUD are thin typed wrappers on top of the same
//! [`transport::Transport`] seam.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use merlin::{CreateResponseRequest, MerlinClient};
//!
//! #[tokio::main]
//! async fn main() -> merlin::Result<()> {
//!     let client = MerlinClient::from_env()?;
//!
//!     let request = CreateResponseRequest::new("gpt-4.1-mini", "Say hello");
//!     let mut events = client.responses().create_stream(&request).await?;
//!     while let Some(event) = events.next().await {
//!         let event = event?;
//!         if let Some(delta) = &event.delta {
//!             print!("{}", delta);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client entry point and builder |
//! | [`config`] | Environment and keyring backed configuration |
//! | [`streaming`] | Event registry, SSE framing, event decoding |
//! | [`uploads`] | Chunked upload coordinator and byte sources |
//! | [`files`] | Files resource |
//! | [`responses`] | Responses resource |
//! | [`types`] | Shared record types, list pages |
//! | [`transport`] | HTTP seam and its reqwest implementation |

pub mod client;
pub mod config;
pub mod files;
pub mod responses;
pub mod streaming;
pub mod transport;
pub mod types;
pub mod uploads;
pub mod utils;

pub use client::{MerlinClient, MerlinClientBuilder};
pub use config::ClientConfig;
pub use files::{File, Files};
pub use responses::{CreateResponseRequest, ResponseObject, Responses};
pub use streaming::{EventStream, StreamAccumulator, StreamEvent};
pub use types::{ApiObject, ListPage};
pub use uploads::{ByteSource, MultipartUpload, Upload, UploadStatus, Uploads};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A pinned, boxed stream of fallible items.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
