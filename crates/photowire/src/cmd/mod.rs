use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod recv;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Accept one peer and receive framed payloads until the stream ends.
    Recv(RecvArgs),
    /// Connect and send payloads as frames.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub async fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Recv(args) => recv::run(args, format).await,
        Command::Send(args) => send::run(args, format).await,
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct RecvArgs {
    /// Address to bind and listen on.
    #[arg(long, default_value = "127.0.0.1:8888")]
    pub bind: SocketAddr,
    /// Directory to write each received payload into (frame-NNNN.bin).
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,
    /// Exit after receiving N frames.
    #[arg(long)]
    pub count: Option<u64>,
    /// Maximum accepted payload size in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_frame_len: Option<u64>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Peer address to connect to.
    #[arg(default_value = "127.0.0.1:8888")]
    pub peer: SocketAddr,
    /// Stream a file as the payload.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
    /// Raw string payload.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Send the payload this many times over the one cached connection.
    #[arg(long, default_value = "1")]
    pub repeat: u32,
    /// Maximum payload size in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_frame_len: Option<u64>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build information.
    #[arg(long)]
    pub extended: bool,
}

/// Token that fires on Ctrl-C, shared by every suspending operation a
/// command performs.
pub(crate) fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let handler = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handler.cancel();
        }
    });
    cancel
}
