//! Collaborator interfaces at the boundary of the transfer core.
//!
//! The core has no opinion on what payload bytes represent. It consumes a
//! [`ByteSource`] (readable bytes of known total length, such as a picked
//! file) and hands completed payloads to a [`FrameSink`] for downstream
//! decoding or rendering.

use std::future::Future;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use tokio::fs::File;
use tokio::io::{AsyncRead, ReadBuf};
use tokio::sync::mpsc;

/// A sequential source of raw bytes with a known total length.
///
/// The declared [`size`](ByteSource::size) is a promise: the source must
/// yield exactly that many bytes before reporting EOF. A source that runs
/// short ruins the frame already on the wire (the header has gone out by
/// the time the shortfall is discovered).
pub trait ByteSource: AsyncRead + Unpin {
    /// Total number of bytes this source will yield.
    fn size(&self) -> u64;
}

/// Receives each fully assembled payload from the receive loop.
///
/// Delivery is synchronous with respect to the loop: the next header read
/// does not begin until `on_frame` has completed. Partial payloads are
/// never delivered.
pub trait FrameSink: Send {
    /// Accept one complete payload.
    fn on_frame(&mut self, payload: Bytes) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// In-memory byte source over an owned buffer.
#[derive(Debug)]
pub struct SliceSource {
    size: u64,
    cursor: io::Cursor<Bytes>,
}

impl SliceSource {
    pub fn new(payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        Self {
            size: payload.len() as u64,
            cursor: io::Cursor::new(payload),
        }
    }
}

impl AsyncRead for SliceSource {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().cursor).poll_read(cx, buf)
    }
}

impl ByteSource for SliceSource {
    fn size(&self) -> u64 {
        self.size
    }
}

/// Byte source backed by a file, with the size taken from its metadata.
///
/// This is the stand-in for the original application's picked photo: the
/// file is streamed onto the wire without being buffered in memory.
#[derive(Debug)]
pub struct FileSource {
    size: u64,
    file: File,
}

impl FileSource {
    /// Open a file and record its current length as the frame size.
    ///
    /// The file must not grow or shrink while the frame is being sent; the
    /// length written in the header is fixed at open time.
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path).await?;
        let size = file.metadata().await?.len();
        Ok(Self { size, file })
    }
}

impl AsyncRead for FileSource {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().file).poll_read(cx, buf)
    }
}

impl ByteSource for FileSource {
    fn size(&self) -> u64 {
        self.size
    }
}

/// Frame sink that forwards payloads into an mpsc channel.
///
/// Useful for embedding the receive loop in a larger application and for
/// tests. If the receiving half has been dropped, payloads are discarded.
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<Bytes>,
}

impl ChannelSink {
    /// Create a sink and the receiver its payloads arrive on.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl FrameSink for ChannelSink {
    fn on_frame(&mut self, payload: Bytes) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            let _ = self.tx.send(payload).await;
        })
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    #[tokio::test]
    async fn slice_source_yields_declared_size() {
        let mut source = SliceSource::new(&b"hello"[..]);
        assert_eq!(source.size(), 5);

        let mut out = Vec::new();
        source.read_to_end(&mut out).await.unwrap();
        assert_eq!(out, b"hello");
    }

    #[tokio::test]
    async fn slice_source_empty() {
        let mut source = SliceSource::new(Bytes::new());
        assert_eq!(source.size(), 0);

        let mut out = Vec::new();
        source.read_to_end(&mut out).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn file_source_reads_whole_file() {
        let dir = std::env::temp_dir().join(format!("photowire-src-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("blob.bin");
        std::fs::write(&path, b"file contents").unwrap();

        let mut source = FileSource::open(&path).await.unwrap();
        assert_eq!(source.size(), 13);

        let mut out = Vec::new();
        source.read_to_end(&mut out).await.unwrap();
        assert_eq!(out, b"file contents");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn channel_sink_forwards_payloads() {
        let (mut sink, mut rx) = ChannelSink::new(4);
        sink.on_frame(Bytes::from_static(b"one")).await;
        sink.on_frame(Bytes::from_static(b"two")).await;

        assert_eq!(rx.recv().await.unwrap().as_ref(), b"one");
        assert_eq!(rx.recv().await.unwrap().as_ref(), b"two");
    }

    #[tokio::test]
    async fn channel_sink_tolerates_dropped_receiver() {
        let (mut sink, rx) = ChannelSink::new(1);
        drop(rx);
        sink.on_frame(Bytes::from_static(b"lost")).await;
    }
}
