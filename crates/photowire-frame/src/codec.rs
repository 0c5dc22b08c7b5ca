use crate::error::{FrameError, Result};

/// Frame header: payload length as an unsigned 64-bit integer, 8 bytes.
pub const LENGTH_HEADER_SIZE: usize = 8;

/// Default maximum payload length: 64 MiB.
///
/// The header alone could declare up to 2^64-1 bytes; accepting that
/// unchecked would let a corrupted or hostile header drive an arbitrarily
/// large allocation, so the reader enforces this cap before allocating.
pub const DEFAULT_MAX_FRAME_LEN: u64 = 64 * 1024 * 1024;

/// Encode a payload length into the wire header.
///
/// Wire format:
/// ```text
/// ┌────────────────────┬──────────────────┐
/// │ Length (8B LE u64) │ Payload          │
/// │                    │ (Length bytes)   │
/// └────────────────────┴──────────────────┘
/// ```
///
/// Little-endian is the cross-implementation compatibility contract: both
/// ends of the wire must use it, or every decoded length is garbage.
pub fn encode_length(len: u64) -> [u8; LENGTH_HEADER_SIZE] {
    len.to_le_bytes()
}

/// Decode a payload length from header bytes.
///
/// Callers must supply at least [`LENGTH_HEADER_SIZE`] bytes; anything less
/// fails with [`FrameError::ShortHeader`]. Extra bytes beyond the header are
/// ignored.
pub fn decode_length(bytes: &[u8]) -> Result<u64> {
    let header: [u8; LENGTH_HEADER_SIZE] = bytes
        .get(..LENGTH_HEADER_SIZE)
        .and_then(|header| header.try_into().ok())
        .ok_or(FrameError::ShortHeader { got: bytes.len() })?;
    Ok(u64::from_le_bytes(header))
}

/// Configuration shared by the frame reader and writer.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload length in bytes. Default: 64 MiB.
    ///
    /// Enforced on the read side before allocation and on the write side
    /// before the header goes out, so a writer never emits a frame its own
    /// peer would reject.
    pub max_frame_len: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}
