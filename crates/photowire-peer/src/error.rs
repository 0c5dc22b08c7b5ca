use std::net::SocketAddr;

use photowire_frame::FrameError;

/// Errors that can occur in peer connection operations.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    /// Failed to bind the listening socket. Fatal at startup.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to accept the inbound connection. Fatal: only one accept is
    /// ever attempted.
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),

    /// Failed to connect to the peer. Nothing is cached, so a later call
    /// re-attempts the connect.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Frame-level error on the receive path.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// A frame write did not complete. No partial retry is attempted; the
    /// caller decides whether the connection is still worth anything.
    #[error("frame write failed: {0}")]
    Write(#[source] FrameError),

    /// The operation's cancellation token fired while it was suspended.
    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, PeerError>;
