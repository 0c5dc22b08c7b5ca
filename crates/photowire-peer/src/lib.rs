//! Connection lifecycle for point-to-point frame transfer over TCP.
//!
//! Two symmetric roles share one wire format:
//! - [`PeerListener`] binds, accepts exactly one inbound peer per process
//!   run, and drives the receive loop until the stream ends.
//! - [`Sender`] connects lazily on first use, caches the connection for
//!   the process lifetime, and writes frames on demand.
//!
//! There is deliberately no retry, reconnect, or re-accept logic: any
//! transport failure after the single connection is established is
//! terminal for that role. Every suspending operation takes a
//! `CancellationToken` so callers can bound the otherwise unbounded waits.

pub mod error;
pub mod receiver;
pub mod sender;

pub use error::{PeerError, Result};
pub use receiver::{LoopEnd, PeerConnection, PeerListener, ReceiveSummary};
pub use sender::Sender;

/// Port the original deployment listened on; the default everywhere an
/// address is configurable.
pub const DEFAULT_PORT: u16 = 8888;
