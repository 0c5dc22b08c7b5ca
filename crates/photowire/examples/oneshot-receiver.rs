//! Minimal one-shot receiver — accepts a single peer and prints each frame.
//!
//! Run with:
//!   cargo run --example oneshot-receiver
//!
//! In another terminal:
//!   cargo run -- send 127.0.0.1:8888 --data 'hello'

use photowire::frame::ChannelSink;
use photowire::peer::PeerListener;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let listener = PeerListener::bind("127.0.0.1:8888".parse()?).await?;
    eprintln!("Listening on {}", listener.local_addr());

    let cancel = CancellationToken::new();
    let conn = listener.accept_once(&cancel).await?;
    eprintln!("Peer connected: {}", conn.peer_addr());

    let (mut sink, mut frames) = ChannelSink::new(16);
    let loop_cancel = cancel.clone();
    let receive = tokio::spawn(async move { conn.receive_loop(&mut sink, &loop_cancel).await });

    while let Some(payload) = frames.recv().await {
        eprintln!("Received {} bytes", payload.len());
    }

    let summary = receive.await??;
    eprintln!("Stream ended after {} frames", summary.frames);
    Ok(())
}
