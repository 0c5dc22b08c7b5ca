/// Errors that can occur during frame encoding, decoding, and transfer.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Fewer than 8 bytes were supplied where a length header was required.
    #[error("length header incomplete ({got} of 8 bytes)")]
    ShortHeader { got: usize },

    /// The declared payload length exceeds the configured maximum.
    #[error("frame too large ({len} bytes, max {max})")]
    FrameTooLarge { len: u64, max: u64 },

    /// The stream ended before the declared payload was fully received.
    /// The partial payload is discarded; it is never delivered downstream.
    #[error("stream ended mid-payload ({got} of {expected} bytes)")]
    TruncatedFrame { expected: u64, got: u64 },

    /// A byte source ran out before producing its declared size. The frame
    /// already on the wire is ruined; the peer will see it as truncated.
    #[error("byte source exhausted early ({got} of {expected} bytes)")]
    SourceExhausted { expected: u64, got: u64 },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
