use std::net::SocketAddr;

use photowire_frame::{FrameConfig, FrameReader, FrameSink};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::error::{PeerError, Result};

/// The listening state of the single-use receiver lifecycle.
///
/// The receiver is a one-way state machine: `Unbound → Listening →
/// Connected → Closed`. Each transition consumes the previous state, so a
/// second accept on the same listener, or reuse of a finished connection,
/// is unrepresentable rather than merely forbidden.
pub struct PeerListener {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: FrameConfig,
}

impl PeerListener {
    /// Bind the listening socket.
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| PeerError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| PeerError::Bind { addr, source })?;
        info!(%local_addr, "listening");
        Ok(Self {
            listener,
            local_addr,
            config: FrameConfig::default(),
        })
    }

    /// Override the frame configuration applied to the accepted connection.
    pub fn with_config(mut self, config: FrameConfig) -> Self {
        self.config = config;
        self
    }

    /// The address the listener is actually bound to.
    ///
    /// Differs from the requested address when binding to port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Suspend until exactly one peer connects, then release the listening
    /// socket; its purpose is exhausted after this call.
    ///
    /// With no peer and no cancellation this waits forever; that is the
    /// documented contract, which is why the token is not optional.
    pub async fn accept_once(self, cancel: &CancellationToken) -> Result<PeerConnection> {
        let (stream, peer_addr) = tokio::select! {
            _ = cancel.cancelled() => return Err(PeerError::Cancelled),
            accepted = self.listener.accept() => accepted.map_err(PeerError::Accept)?,
        };
        debug!(%peer_addr, "accepted peer; listener released");
        drop(self.listener);
        Ok(PeerConnection {
            stream,
            peer_addr,
            config: self.config,
        })
    }
}

/// The connected state: one accepted duplex stream, owned exclusively by
/// the receive loop for its entire lifetime.
pub struct PeerConnection {
    stream: TcpStream,
    peer_addr: SocketAddr,
    config: FrameConfig,
}

impl PeerConnection {
    /// Address of the connected peer.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Read framed payloads until the stream ends, the token fires, or an
    /// error terminates the loop. Consumes the connection: when this
    /// returns, the stream is closed and the receiving capability of the
    /// process is spent.
    ///
    /// The loop is single-frame-in-flight: `sink.on_frame` is awaited to
    /// completion before the next header read begins. Failures are never
    /// recovered here: a truncated payload or I/O error is surfaced to
    /// the caller, who owns the decision to start a whole new receive
    /// cycle (new bind, new accept) or give up.
    pub async fn receive_loop<S: FrameSink>(
        self,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<ReceiveSummary> {
        let peer_addr = self.peer_addr;
        let mut reader = FrameReader::with_config(self.stream, self.config);
        let mut frames = 0u64;
        loop {
            // Biased so a fired token always wins over newly arrived data.
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(%peer_addr, frames, "receive loop cancelled");
                    return Ok(ReceiveSummary {
                        frames,
                        end: LoopEnd::Cancelled,
                    });
                }
                next = reader.read_frame() => next,
            };
            match next {
                Ok(Some(payload)) => {
                    trace!(len = payload.len(), "delivering frame");
                    sink.on_frame(payload).await;
                    frames += 1;
                }
                Ok(None) => {
                    info!(%peer_addr, frames, "peer closed the stream");
                    return Ok(ReceiveSummary {
                        frames,
                        end: LoopEnd::EndOfStream,
                    });
                }
                Err(err) => {
                    warn!(%peer_addr, frames, %err, "receive loop terminated");
                    return Err(err.into());
                }
            }
        }
    }
}

/// How a completed receive loop ended, with the number of frames that were
/// fully delivered to the sink.
#[derive(Debug)]
pub struct ReceiveSummary {
    pub frames: u64,
    pub end: LoopEnd,
}

/// Non-error receive loop terminations.
#[derive(Debug, PartialEq, Eq)]
pub enum LoopEnd {
    /// The peer closed the stream at (or inside) a frame header.
    EndOfStream,
    /// The cancellation token fired. Any in-flight frame was discarded.
    Cancelled,
}
