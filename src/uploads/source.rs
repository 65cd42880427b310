//! Upload sources and size resolution.
//!
//! The total size must be known before an upload is created. It is resolved by
//! filesystem metadata, then by an explicit length, then by buffering the
//! source in memory, in that order.

use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use std::fmt;
use std::io::Cursor;
use std::path::PathBuf;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

type Reader = Box<dyn AsyncRead + Send + Unpin>;

enum SourceKind {
    Path(PathBuf),
    Buffer(Bytes),
    File(tokio::fs::File),
    Reader { reader: Reader, len: Option<u64> },
}

/// Where upload bytes come from.
pub struct ByteSource {
    kind: SourceKind,
    name: Option<String>,
}

impl fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            SourceKind::Path(p) => format!("Path({})", p.display()),
            SourceKind::Buffer(b) => format!("Buffer({} bytes)", b.len()),
            SourceKind::File(_) => "File".to_string(),
            SourceKind::Reader { len, .. } => format!("Reader(len={:?})", len),
        };
        f.debug_struct("ByteSource")
            .field("kind", &kind)
            .field("name", &self.name)
            .finish()
    }
}

impl ByteSource {
    /// A file on disk. Its base name becomes the default upload filename.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty());
        Self {
            kind: SourceKind::Path(path),
            name,
        }
    }

    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self {
            kind: SourceKind::Buffer(data.into()),
            name: None,
        }
    }

    /// An already-open file; its size comes from metadata.
    pub fn from_file(file: tokio::fs::File) -> Self {
        Self {
            kind: SourceKind::File(file),
            name: None,
        }
    }

    /// An arbitrary reader of unknown length. It is buffered in full to measure it.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            kind: SourceKind::Reader {
                reader: Box::new(reader),
                len: None,
            },
            name: None,
        }
    }

    /// A reader whose length the caller already knows.
    pub fn from_reader_with_len<R>(reader: R, len: u64) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            kind: SourceKind::Reader {
                reader: Box::new(reader),
                len: Some(len),
            },
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Resolve the size and open the byte stream.
    pub async fn open(self) -> Result<OpenedSource> {
        let name = self.name;
        let (size, reader): (u64, Reader) = match self.kind {
            SourceKind::Path(path) => {
                let meta = tokio::fs::metadata(&path)
                    .await
                    .map_err(|e| unreadable(&path, e))?;
                if meta.is_dir() {
                    return Err(Error::validation_with_context(
                        format!("upload source '{}' is a directory", path.display()),
                        ErrorContext::new().with_field_path("source"),
                    ));
                }
                let file = tokio::fs::File::open(&path)
                    .await
                    .map_err(|e| unreadable(&path, e))?;
                (meta.len(), Box::new(file) as Reader)
            }
            SourceKind::Buffer(data) => (data.len() as u64, Box::new(Cursor::new(data)) as Reader),
            SourceKind::File(mut file) => match file.metadata().await {
                Ok(meta) if meta.is_file() => (meta.len(), Box::new(file) as Reader),
                _ => {
                    let data = buffer_all(&mut file).await?;
                    (data.len() as u64, Box::new(Cursor::new(data)) as Reader)
                }
            },
            SourceKind::Reader {
                reader,
                len: Some(len),
            } => (len, reader),
            SourceKind::Reader {
                mut reader,
                len: None,
            } => {
                let data = buffer_all(&mut reader).await?;
                (data.len() as u64, Box::new(Cursor::new(data)) as Reader)
            }
        };

        Ok(OpenedSource {
            size,
            name,
            reader,
            consumed: 0,
        })
    }
}

impl From<Bytes> for ByteSource {
    fn from(data: Bytes) -> Self {
        Self::from_bytes(data)
    }
}

impl From<Vec<u8>> for ByteSource {
    fn from(data: Vec<u8>) -> Self {
        Self::from_bytes(data)
    }
}

impl From<PathBuf> for ByteSource {
    fn from(path: PathBuf) -> Self {
        Self::from_path(path)
    }
}

fn unreadable(path: &std::path::Path, e: std::io::Error) -> Error {
    Error::validation_with_context(
        format!("cannot read upload source '{}': {}", path.display(), e),
        ErrorContext::new().with_field_path("source"),
    )
}

async fn buffer_all<R: AsyncRead + Unpin + ?Sized>(reader: &mut R) -> Result<Bytes> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data).await?;
    debug!(bytes = data.len(), "buffered upload source to measure its size");
    Ok(Bytes::from(data))
}

/// A source whose size is known, ready to be read sequentially.
pub struct OpenedSource {
    size: u64,
    name: Option<String>,
    reader: Reader,
    consumed: u64,
}

impl fmt::Debug for OpenedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenedSource")
            .field("size", &self.size)
            .field("name", &self.name)
            .field("consumed", &self.consumed)
            .finish()
    }
}

impl OpenedSource {
    /// Declared total size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Bytes handed out so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Read up to `max` bytes. Short chunks only happen at end of input;
    /// `None` means the source is exhausted.
    pub async fn read_chunk(&mut self, max: usize) -> Result<Option<Bytes>> {
        let remaining = self.size.saturating_sub(self.consumed);
        let capacity = usize::try_from(remaining).unwrap_or(max).min(max);
        let mut buf = Vec::with_capacity(capacity);
        (&mut self.reader).take(max as u64).read_to_end(&mut buf).await?;
        if buf.is_empty() {
            return Ok(None);
        }
        self.consumed += buf.len() as u64;
        Ok(Some(Bytes::from(buf)))
    }

    /// Read everything that is left.
    pub async fn read_all(mut self) -> Result<Bytes> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf).await?;
        self.consumed += buf.len() as u64;
        Ok(Bytes::from(buf))
    }
}
