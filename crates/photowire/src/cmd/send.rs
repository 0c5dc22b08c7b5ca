use photowire_frame::{FileSource, FrameConfig};
use photowire_peer::Sender;

use crate::cmd::{cancel_on_ctrl_c, SendArgs};
use crate::exit::{io_error, peer_error, CliResult, SUCCESS};
use crate::output::{print_sent, OutputFormat};

pub async fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let cancel = cancel_on_ctrl_c();

    let mut sender = Sender::new(args.peer);
    if let Some(max_frame_len) = args.max_frame_len {
        sender = sender.with_config(FrameConfig { max_frame_len });
    }

    let mut total_bytes = 0u64;
    for _ in 0..args.repeat {
        // The file is reopened per frame, the way the original application
        // reopened the picked photo on every send.
        total_bytes += match (&args.file, &args.data) {
            (Some(path), _) => {
                let mut source = FileSource::open(path).await.map_err(|err| {
                    io_error(&format!("failed opening {}", path.display()), err)
                })?;
                sender
                    .send_frame(&mut source, &cancel)
                    .await
                    .map_err(|err| peer_error("send failed", err))?
            }
            (None, Some(data)) => sender
                .send_bytes(data.as_bytes(), &cancel)
                .await
                .map_err(|err| peer_error("send failed", err))?,
            // No payload given: send an empty frame.
            (None, None) => sender
                .send_bytes(&[], &cancel)
                .await
                .map_err(|err| peer_error("send failed", err))?,
        };
    }

    print_sent(
        &args.peer.to_string(),
        u64::from(args.repeat),
        total_bytes,
        format,
    );
    Ok(SUCCESS)
}
