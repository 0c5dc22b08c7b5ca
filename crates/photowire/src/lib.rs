//! Point-to-point framed blob transfer over TCP.
//!
//! An opaque, size-prefixed payload (originally an image) travels from one
//! peer to another over a reliable byte stream. The stream has no message
//! boundaries, so every payload is framed with an 8-byte little-endian
//! length header; the length is the only structural signal on the wire.
//!
//! # Crate Structure
//!
//! - [`frame`]: Length-prefixed frame codec, async reader/writer, and the
//!   `ByteSource` / `FrameSink` boundary traits
//! - [`peer`]: Connection lifecycle, accept-once receiver and
//!   lazy-connect sender

/// Re-export frame types.
pub mod frame {
    pub use photowire_frame::*;
}

/// Re-export peer types.
pub mod peer {
    pub use photowire_peer::*;
}
