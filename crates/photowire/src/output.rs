use std::io::{IsTerminal, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One fully assembled payload as seen by the `recv` command.
pub struct ReceivedFrame<'a> {
    pub seq: u64,
    pub payload: &'a Bytes,
    pub peer: &'a str,
    pub saved_to: Option<&'a Path>,
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    seq: u64,
    payload_size: usize,
    peer: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<String>,
    timestamp: String,
}

pub fn print_received(frame: &ReceivedFrame<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                seq: frame.seq,
                payload_size: frame.payload.len(),
                peer: frame.peer,
                saved_to: frame.saved_to.map(|path| path.display().to_string()),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SEQ", "SIZE", "PEER", "SAVED TO"])
                .add_row(vec![
                    frame.seq.to_string(),
                    frame.payload.len().to_string(),
                    frame.peer.to_string(),
                    frame
                        .saved_to
                        .map(|path| path.display().to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "seq={} size={} peer={} saved_to={}",
                frame.seq,
                frame.payload.len(),
                frame.peer,
                frame
                    .saved_to
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
        }
        OutputFormat::Raw => {
            print_raw(frame.payload.as_ref());
        }
    }
}

#[derive(Serialize)]
struct SendOutput<'a> {
    peer: &'a str,
    frames: u64,
    bytes: u64,
    timestamp: String,
}

pub fn print_sent(peer: &str, frames: u64, bytes: u64, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = SendOutput {
                peer,
                frames,
                bytes,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PEER", "FRAMES", "BYTES"])
                .add_row(vec![
                    peer.to_string(),
                    frames.to_string(),
                    bytes.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("peer={peer} frames={frames} bytes={bytes}");
        }
        OutputFormat::Raw => {}
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
