use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::codec::{encode_length, FrameConfig};
use crate::error::{FrameError, Result};
use crate::source::ByteSource;

const COPY_CHUNK_SIZE: usize = 64 * 1024;

/// Writes complete frames to any `AsyncWrite` stream.
///
/// The header and payload of one frame must reach the peer as one
/// uninterrupted unit. There is no mechanism to recover from a writer
/// failing mid-frame; the receiver would block on the remainder or see a
/// truncated frame. That limitation is inherited from the wire format.
pub struct FrameWriter<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: AsyncWrite + Unpin> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Encode and send one in-memory payload as a frame.
    pub async fn send(&mut self, payload: &[u8]) -> Result<()> {
        let len = payload.len() as u64;
        self.check_len(len)?;

        self.inner.write_all(&encode_length(len)).await?;
        self.inner.write_all(payload).await?;
        self.flush().await?;

        debug!(len, "frame written");
        Ok(())
    }

    /// Stream one frame from a byte source of known size.
    ///
    /// The payload is copied in chunks rather than buffered whole, so a
    /// large blob never has to fit in memory. If the source reports EOF
    /// before yielding its declared size, [`FrameError::SourceExhausted`]
    /// is returned, and the frame on the wire is already ruined, since
    /// its header went out first.
    pub async fn send_from<S: ByteSource>(&mut self, source: &mut S) -> Result<()> {
        let len = source.size();
        self.check_len(len)?;

        self.inner.write_all(&encode_length(len)).await?;

        let mut chunk = vec![0u8; COPY_CHUNK_SIZE];
        let mut copied = 0u64;
        while copied < len {
            let want = chunk.len().min((len - copied) as usize);
            let read = source.read(&mut chunk[..want]).await?;
            if read == 0 {
                return Err(FrameError::SourceExhausted {
                    expected: len,
                    got: copied,
                });
            }
            self.inner.write_all(&chunk[..read]).await?;
            copied += read as u64;
        }
        self.flush().await?;

        debug!(len, "frame streamed");
        Ok(())
    }

    /// Flush the underlying stream.
    pub async fn flush(&mut self) -> Result<()> {
        self.inner.flush().await.map_err(FrameError::Io)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    fn check_len(&self, len: u64) -> Result<()> {
        if len > self.config.max_frame_len {
            return Err(FrameError::FrameTooLarge {
                len,
                max: self.config.max_frame_len,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use tokio::io::{AsyncRead, ReadBuf};

    use super::*;
    use crate::codec::{decode_length, LENGTH_HEADER_SIZE};
    use crate::reader::FrameReader;
    use crate::source::SliceSource;

    #[tokio::test]
    async fn written_frame_decodes_back() {
        let mut writer = FrameWriter::new(Vec::<u8>::new());
        writer.send(b"hello").await.unwrap();

        let wire = writer.into_inner();
        assert_eq!(decode_length(&wire).unwrap(), 5);
        assert_eq!(&wire[LENGTH_HEADER_SIZE..], b"hello");
    }

    #[tokio::test]
    async fn empty_payload_is_a_header_only_frame() {
        let mut writer = FrameWriter::new(Vec::<u8>::new());
        writer.send(b"").await.unwrap();

        let wire = writer.into_inner();
        assert_eq!(wire.len(), LENGTH_HEADER_SIZE);
        assert_eq!(decode_length(&wire).unwrap(), 0);
    }

    #[tokio::test]
    async fn back_to_back_frames_concatenate() {
        let mut writer = FrameWriter::new(Vec::<u8>::new());
        writer.send(&[0x01, 0x02, 0x03]).await.unwrap();
        writer.send(b"").await.unwrap();

        let mut reader = FrameReader::new(std::io::Cursor::new(writer.into_inner()));
        let first = reader.read_frame().await.unwrap().unwrap();
        let second = reader.read_frame().await.unwrap().unwrap();

        assert_eq!(first.as_ref(), &[0x01, 0x02, 0x03]);
        assert!(second.is_empty());
        assert!(reader.read_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn oversized_payload_rejected_before_any_write() {
        let cfg = FrameConfig { max_frame_len: 4 };
        let mut writer = FrameWriter::with_config(Vec::<u8>::new(), cfg);

        let err = writer.send(b"oversized").await.unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLarge { len: 9, max: 4 }));
        assert!(writer.get_ref().is_empty(), "no bytes may reach the wire");
    }

    #[tokio::test]
    async fn send_from_streams_source() {
        let payload = vec![0xEF; 200 * 1024];
        let mut source = SliceSource::new(payload.clone());

        let mut writer = FrameWriter::new(Vec::<u8>::new());
        writer.send_from(&mut source).await.unwrap();

        let mut reader = FrameReader::new(std::io::Cursor::new(writer.into_inner()));
        let out = reader.read_frame().await.unwrap().unwrap();
        assert_eq!(out.as_ref(), payload.as_slice());
    }

    #[tokio::test]
    async fn send_from_empty_source() {
        let mut source = SliceSource::new(bytes::Bytes::new());
        let mut writer = FrameWriter::new(Vec::<u8>::new());
        writer.send_from(&mut source).await.unwrap();

        assert_eq!(writer.get_ref().len(), LENGTH_HEADER_SIZE);
    }

    #[tokio::test]
    async fn short_source_surfaces_exhaustion() {
        let mut source = LyingSource {
            claimed: 10,
            inner: io::Cursor::new(b"four".to_vec()),
        };
        let mut writer = FrameWriter::new(Vec::<u8>::new());

        let err = writer.send_from(&mut source).await.unwrap_err();
        assert!(matches!(
            err,
            FrameError::SourceExhausted {
                expected: 10,
                got: 4
            }
        ));
    }

    /// Declares more bytes than it can deliver.
    struct LyingSource {
        claimed: u64,
        inner: io::Cursor<Vec<u8>>,
    }

    impl AsyncRead for LyingSource {
        fn poll_read(
            self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
        }
    }

    impl ByteSource for LyingSource {
        fn size(&self) -> u64 {
            self.claimed
        }
    }
}
