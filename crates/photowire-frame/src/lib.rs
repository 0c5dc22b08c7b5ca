//! Length-prefixed framing for point-to-point blob transfer.
//!
//! The wire carries opaque payloads over a reliable byte stream that has no
//! message boundaries of its own. Every frame is:
//! - An 8-byte little-endian payload length
//! - Exactly that many payload bytes, no separators, no padding
//!
//! No magic number, no version field, no checksum: the length is the sole
//! structural signal, so both ends must agree on the byte order. Short reads
//! and short writes are handled internally; callers only ever see complete
//! frames.

pub mod codec;
pub mod error;
pub mod reader;
pub mod source;
pub mod writer;

pub use codec::{
    decode_length, encode_length, FrameConfig, DEFAULT_MAX_FRAME_LEN, LENGTH_HEADER_SIZE,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use source::{ByteSource, ChannelSink, FileSource, FrameSink, SliceSource};
pub use writer::FrameWriter;
