//! Document content payloads.

use std::fmt;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{Error, Result};

/// Default MIME type used when the caller does not know better.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Upper bound on the buffer reserved up front by [`ContentStream::from_reader`].
const MAX_PREALLOCATION: usize = 1 << 20;

/// Immutable document content together with its filename and MIME type.
///
/// Construction checks that the declared length matches the bytes supplied,
/// so a stream never travels with a lying `Content-Length`. Create and
/// check-in calls take the stream by value and consume it.
#[derive(Clone, PartialEq, Eq)]
pub struct ContentStream {
    filename: String,
    mime_type: String,
    data: Bytes,
}

impl ContentStream {
    /// Creates a content stream from an in-memory byte source.
    ///
    /// Fails with [`InvalidArgument`](crate::ErrorKind::InvalidArgument) when
    /// `length` differs from the number of bytes in `source`.
    pub fn new(
        filename: impl Into<String>,
        length: u64,
        mime_type: impl Into<String>,
        source: impl Into<Bytes>,
    ) -> Result<Self> {
        let data = source.into();
        if data.len() as u64 != length {
            return Err(Error::invalid_argument().with_message(format!(
                "declared length {length} does not match {} available bytes",
                data.len()
            )));
        }

        Self::from_bytes(filename, mime_type, data)
    }

    /// Creates a content stream whose length is taken from the bytes themselves.
    pub fn from_bytes(
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Result<Self> {
        let filename = filename.into();
        if filename.trim().is_empty() {
            return Err(Error::invalid_argument().with_message("content stream filename is empty"));
        }

        let mime_type = mime_type.into();
        let mime_type = if mime_type.trim().is_empty() {
            DEFAULT_MIME_TYPE.to_owned()
        } else {
            mime_type
        };

        Ok(Self {
            filename,
            mime_type,
            data: data.into(),
        })
    }

    /// Reads exactly `length` bytes from `reader`.
    ///
    /// Reads at most one byte past `length` to detect a longer source; both a
    /// short and a long source fail with
    /// [`InvalidArgument`](crate::ErrorKind::InvalidArgument).
    pub async fn from_reader<R>(
        filename: impl Into<String>,
        length: u64,
        mime_type: impl Into<String>,
        reader: R,
    ) -> Result<Self>
    where
        R: AsyncRead + Unpin,
    {
        let capacity = usize::try_from(length).map_err(|_| {
            Error::invalid_argument().with_message(format!("length {length} exceeds address space"))
        })?;

        let mut buf = Vec::with_capacity(capacity.min(MAX_PREALLOCATION));
        reader.take(length.saturating_add(1)).read_to_end(&mut buf).await?;

        Self::new(filename, length, mime_type, buf)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn length(&self) -> u64 {
        self.data.len() as u64
    }

    /// Returns a cheap clone of the content bytes.
    pub fn to_bytes(&self) -> Bytes {
        self.data.clone()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the stream and returns its bytes.
    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

impl fmt::Debug for ContentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentStream")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("length", &self.data.len())
            .finish()
    }
}
