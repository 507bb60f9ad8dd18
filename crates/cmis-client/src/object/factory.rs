use bytes::Bytes;
use cmis_core::types::{ContentStream, Properties};
use tokio::io::AsyncRead;

use crate::Result;

/// Builds the values passed to create and check-in calls.
///
/// Construction is local: nothing is sent until the value is handed to a
/// folder or document operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectFactory;

impl ObjectFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates a content stream from bytes already in memory.
    ///
    /// Fails with [`InvalidArgument`](crate::ErrorKind::InvalidArgument) if
    /// `length` is not the number of bytes in `source`.
    pub fn create_content_stream(
        &self,
        filename: impl Into<String>,
        length: u64,
        mime_type: impl Into<String>,
        source: impl Into<Bytes>,
    ) -> Result<ContentStream> {
        ContentStream::new(filename, length, mime_type, source)
    }

    /// Creates a content stream by reading exactly `length` bytes from `reader`.
    pub async fn create_content_stream_from_reader<R>(
        &self,
        filename: impl Into<String>,
        length: u64,
        mime_type: impl Into<String>,
        reader: R,
    ) -> Result<ContentStream>
    where
        R: AsyncRead + Unpin,
    {
        ContentStream::from_reader(filename, length, mime_type, reader).await
    }

    /// Starts a property bag naming the object type and name of a new object.
    pub fn create_properties(
        &self,
        object_type_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Properties {
        Properties::for_create(object_type_id, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn content_length_is_checked() {
        let factory = ObjectFactory::new();
        let stream = factory
            .create_content_stream("test.txt", 5, "text/plain", "hello")
            .unwrap();
        assert_eq!(stream.length(), 5);

        let err = factory
            .create_content_stream("test.txt", 6, "text/plain", "hello")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn reader_source_must_match_length() {
        let factory = ObjectFactory::new();
        let err = factory
            .create_content_stream_from_reader("a.bin", 10, "", &b"short"[..])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }
}
