use std::io::ErrorKind;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{trace, warn};

use crate::codec::{decode_length, FrameConfig, LENGTH_HEADER_SIZE};
use crate::error::{FrameError, Result};

/// Reads complete frames from any `AsyncRead` stream.
///
/// The underlying stream offers no message boundaries; reads may return
/// short. The reader loops until a full header and a full payload have
/// arrived; callers only ever see complete frames.
pub struct FrameReader<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: AsyncRead + Unpin> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Read the next complete frame.
    ///
    /// Returns `Ok(None)` when the stream ends at a frame boundary, or ends
    /// inside a length header; both count as graceful end-of-stream. A
    /// stream that ends mid-payload is an error: the in-flight frame is
    /// discarded and [`FrameError::TruncatedFrame`] is returned.
    pub async fn read_frame(&mut self) -> Result<Option<Bytes>> {
        let mut header = [0u8; LENGTH_HEADER_SIZE];
        let mut filled = 0usize;
        while filled < LENGTH_HEADER_SIZE {
            let read = match self.inner.read(&mut header[filled..]).await {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };
            if read == 0 {
                if filled > 0 {
                    warn!(got = filled, "stream ended inside a length header");
                }
                return Ok(None);
            }
            filled += read;
        }

        let len = decode_length(&header)?;
        if len > self.config.max_frame_len {
            return Err(FrameError::FrameTooLarge {
                len,
                max: self.config.max_frame_len,
            });
        }

        // The configured cap may exceed what this target can address.
        let capacity = usize::try_from(len).map_err(|_| FrameError::FrameTooLarge {
            len,
            max: self.config.max_frame_len,
        })?;
        let mut payload = vec![0u8; capacity];
        let mut got = 0usize;
        while got < payload.len() {
            let read = match self.inner.read(&mut payload[got..]).await {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };
            if read == 0 {
                return Err(FrameError::TruncatedFrame {
                    expected: len,
                    got: got as u64,
                });
            }
            got += read;
        }

        trace!(len, "frame assembled");
        Ok(Some(Bytes::from(payload)))
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use tokio::io::ReadBuf;

    use super::*;
    use crate::codec::encode_length;

    fn wire_frame(payload: &[u8]) -> Vec<u8> {
        let mut wire = encode_length(payload.len() as u64).to_vec();
        wire.extend_from_slice(payload);
        wire
    }

    #[tokio::test]
    async fn read_single_frame() {
        let mut reader = FrameReader::new(Cursor::new(wire_frame(b"hello")));
        let payload = reader.read_frame().await.unwrap().unwrap();
        assert_eq!(payload.as_ref(), b"hello");
    }

    #[tokio::test]
    async fn read_zero_length_frame() {
        let mut reader = FrameReader::new(Cursor::new(wire_frame(b"")));
        let payload = reader.read_frame().await.unwrap().unwrap();
        assert!(payload.is_empty());
        assert!(reader.read_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn multi_frame_ordering_preserved() {
        let mut wire = wire_frame(&[0x01, 0x02, 0x03]);
        wire.extend_from_slice(&wire_frame(b""));

        let mut reader = FrameReader::new(Cursor::new(wire));
        let first = reader.read_frame().await.unwrap().unwrap();
        let second = reader.read_frame().await.unwrap().unwrap();

        assert_eq!(first.as_ref(), &[0x01, 0x02, 0x03]);
        assert!(second.is_empty());
        assert!(reader.read_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clean_eof_is_not_an_error() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        assert!(reader.read_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn partial_header_at_eof_ends_gracefully() {
        let mut reader = FrameReader::new(Cursor::new(vec![0x05, 0x00, 0x00]));
        assert!(reader.read_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn truncated_payload_is_an_error() {
        let mut wire = encode_length(10).to_vec();
        wire.extend_from_slice(b"only");

        let mut reader = FrameReader::new(Cursor::new(wire));
        let err = reader.read_frame().await.unwrap_err();
        assert!(matches!(
            err,
            FrameError::TruncatedFrame {
                expected: 10,
                got: 4
            }
        ));
    }

    #[tokio::test]
    async fn oversized_header_rejected_before_allocation() {
        let wire = encode_length(u64::MAX).to_vec();

        let mut reader = FrameReader::new(Cursor::new(wire));
        let err = reader.read_frame().await.unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLarge { .. }));
    }

    #[tokio::test]
    async fn frame_at_configured_cap_accepted() {
        let payload = vec![0xAB; 32];
        let cfg = FrameConfig { max_frame_len: 32 };

        let mut reader = FrameReader::with_config(Cursor::new(wire_frame(&payload)), cfg);
        let out = reader.read_frame().await.unwrap().unwrap();
        assert_eq!(out.as_ref(), payload.as_slice());
    }

    #[tokio::test]
    async fn unbounded_cap_still_reads_small_frames() {
        // The cap can be raised past the address space of 32-bit targets;
        // allocation is guarded by a checked conversion, not by the cap.
        let cfg = FrameConfig {
            max_frame_len: u64::MAX,
        };
        let mut reader = FrameReader::with_config(Cursor::new(wire_frame(b"tiny")), cfg);
        let out = reader.read_frame().await.unwrap().unwrap();
        assert_eq!(out.as_ref(), b"tiny");
    }

    #[tokio::test]
    async fn byte_by_byte_delivery_yields_one_frame() {
        let reader = ByteByByteReader {
            bytes: wire_frame(b"slow"),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);

        let payload = framed.read_frame().await.unwrap().unwrap();
        assert_eq!(payload.as_ref(), b"slow");
        assert!(framed.read_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn large_payload_across_many_short_reads() {
        let payload = vec![0xCD; 4096];
        let reader = ByteByByteReader {
            bytes: wire_frame(&payload),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);

        let out = framed.read_frame().await.unwrap().unwrap();
        assert_eq!(out.as_ref(), payload.as_slice());
    }

    #[tokio::test]
    async fn accessors_and_into_inner() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let _ = reader.get_ref();
        let _ = reader.get_mut();
        let _inner = reader.into_inner();
    }

    /// Simulates the worst case of a boundary-free stream: every read call
    /// returns a single byte.
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl AsyncRead for ByteByByteReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            let this = self.get_mut();
            if this.pos < this.bytes.len() && buf.remaining() > 0 {
                buf.put_slice(&this.bytes[this.pos..this.pos + 1]);
                this.pos += 1;
            }
            Poll::Ready(Ok(()))
        }
    }
}
