use std::net::SocketAddr;

use photowire_frame::{ByteSource, FrameConfig, FrameWriter, SliceSource};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{PeerError, Result};

/// The sending role: one lazily established outbound connection, reused
/// for every frame the process ever sends.
///
/// The first send (or an explicit [`ensure_connected`](Self::ensure_connected))
/// dials the peer; the resulting connection is cached and never recreated.
/// A failed connect caches nothing, so the next call re-attempts it. A
/// failed write leaves the cached connection in place; there is no
/// reconnect-on-failure policy, and the caller decides what a broken
/// connection is worth.
///
/// Concurrent callers are serialized internally: at most one frame is in
/// flight at a time, so two frames' bytes can never interleave on the wire.
pub struct Sender {
    peer_addr: SocketAddr,
    config: FrameConfig,
    conn: Mutex<Option<FrameWriter<TcpStream>>>,
}

impl Sender {
    /// Create a sender for a fixed peer address. Performs no I/O.
    pub fn new(peer_addr: SocketAddr) -> Self {
        Self {
            peer_addr,
            config: FrameConfig::default(),
            conn: Mutex::new(None),
        }
    }

    /// Override the frame configuration applied to the connection.
    pub fn with_config(mut self, config: FrameConfig) -> Self {
        self.config = config;
        self
    }

    /// The peer address this sender dials.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Establish the connection if none is cached. Idempotent: a cached
    /// connection makes this a no-op with no connect attempt.
    pub async fn ensure_connected(&self, cancel: &CancellationToken) -> Result<()> {
        let mut conn = self.conn.lock().await;
        self.connect_if_needed(&mut conn, cancel).await?;
        Ok(())
    }

    /// Send one frame streamed from a byte source, connecting first if
    /// needed. Suspends for the connect, the header write, and the payload
    /// copy; cancellation mid-payload ruins the frame on the wire, which
    /// the wire format cannot express or recover from.
    pub async fn send_frame<S: ByteSource>(
        &self,
        source: &mut S,
        cancel: &CancellationToken,
    ) -> Result<u64> {
        let len = source.size();
        let mut conn = self.conn.lock().await;
        let writer = self.connect_if_needed(&mut conn, cancel).await?;

        let sent = tokio::select! {
            _ = cancel.cancelled() => return Err(PeerError::Cancelled),
            sent = writer.send_from(source) => sent,
        };
        sent.map_err(PeerError::Write)?;

        debug!(len, peer = %self.peer_addr, "frame sent");
        Ok(len)
    }

    /// Send one in-memory payload as a frame.
    pub async fn send_bytes(&self, payload: &[u8], cancel: &CancellationToken) -> Result<u64> {
        let mut source = SliceSource::new(payload.to_vec());
        self.send_frame(&mut source, cancel).await
    }

    async fn connect_if_needed<'a>(
        &self,
        conn: &'a mut Option<FrameWriter<TcpStream>>,
        cancel: &CancellationToken,
    ) -> Result<&'a mut FrameWriter<TcpStream>> {
        match conn {
            Some(writer) => Ok(writer),
            None => {
                let stream = tokio::select! {
                    _ = cancel.cancelled() => return Err(PeerError::Cancelled),
                    connected = TcpStream::connect(self.peer_addr) => {
                        connected.map_err(|source| PeerError::Connect {
                            addr: self.peer_addr,
                            source,
                        })?
                    }
                };
                info!(peer = %self.peer_addr, "connected");
                Ok(conn.insert(FrameWriter::with_config(stream, self.config.clone())))
            }
        }
    }
}
