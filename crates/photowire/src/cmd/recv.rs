use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use bytes::Bytes;
use photowire_frame::{FrameConfig, FrameSink};
use photowire_peer::{PeerError, PeerListener};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cmd::{cancel_on_ctrl_c, RecvArgs};
use crate::exit::{io_error, peer_error, CliResult, SUCCESS};
use crate::output::{print_received, OutputFormat, ReceivedFrame};

pub async fn run(args: RecvArgs, format: OutputFormat) -> CliResult<i32> {
    let mut listener = PeerListener::bind(args.bind)
        .await
        .map_err(|err| peer_error("bind failed", err))?;
    if let Some(max_frame_len) = args.max_frame_len {
        listener = listener.with_config(FrameConfig { max_frame_len });
    }

    if let Some(dir) = &args.out {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|err| io_error("failed creating output directory", err))?;
    }

    let cancel = cancel_on_ctrl_c();

    let conn = match listener.accept_once(&cancel).await {
        Ok(conn) => conn,
        Err(PeerError::Cancelled) => return Ok(SUCCESS),
        Err(err) => return Err(peer_error("accept failed", err)),
    };

    let peer = conn.peer_addr().to_string();
    let mut sink = DirSink {
        out: args.out,
        peer,
        format,
        seq: 0,
        limit: args.count,
        cancel: cancel.clone(),
        write_failure: None,
    };

    let summary = conn
        .receive_loop(&mut sink, &cancel)
        .await
        .map_err(|err| peer_error("receive failed", err))?;
    if let Some(err) = sink.write_failure.take() {
        return Err(io_error("failed writing frame", err));
    }

    info!(frames = summary.frames, "receive loop finished");
    Ok(SUCCESS)
}

/// Writes each payload into the output directory and prints a summary.
///
/// The stand-in for the original application's decode-and-display path:
/// once a payload is complete, what happens to it is none of the core's
/// business.
struct DirSink {
    out: Option<PathBuf>,
    peer: String,
    format: OutputFormat,
    seq: u64,
    limit: Option<u64>,
    cancel: CancellationToken,
    write_failure: Option<std::io::Error>,
}

impl FrameSink for DirSink {
    fn on_frame(&mut self, payload: Bytes) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            let seq = self.seq;
            self.seq += 1;

            let saved_to = match &self.out {
                Some(dir) => {
                    let path = dir.join(frame_file_name(seq));
                    match tokio::fs::write(&path, &payload).await {
                        Ok(()) => Some(path),
                        Err(err) => {
                            // A sink returns nothing; park the failure and
                            // stop the loop so `run` can surface it.
                            self.write_failure = Some(err);
                            self.cancel.cancel();
                            return;
                        }
                    }
                }
                None => None,
            };

            print_received(
                &ReceivedFrame {
                    seq,
                    payload: &payload,
                    peer: &self.peer,
                    saved_to: saved_to.as_deref(),
                },
                self.format,
            );

            if self.limit.is_some_and(|limit| self.seq >= limit) {
                self.cancel.cancel();
            }
        })
    }
}

fn frame_file_name(seq: u64) -> String {
    format!("frame-{seq:04}.bin")
}
