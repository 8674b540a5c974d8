//! Outbound line queue and the task draining it.
//!
//! Every line for a connection goes through one unbounded channel into one
//! task, so concurrent senders never interleave partial writes.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::command::outgoing::redact;

/// Sending half of a connection's outbound queue.
pub(crate) type Outbound = mpsc::UnboundedSender<String>;

/// Terminate a command with exactly one `\r\n`.
///
/// Line breaks inside the command become spaces so one call always writes
/// one protocol line. Returns `None` when nothing is left once trailing
/// line endings are removed.
pub(crate) fn normalize(command: &str) -> Option<String> {
    let line = command.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return None;
    }
    let mut out: String = line
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();
    out.push_str("\r\n");
    Some(out)
}

/// Spawn the writer task for `sink`.
///
/// The task ends when `cancel` fires or every sender is dropped; either way
/// the sink is shut down so the peer sees the close.
pub(crate) fn spawn_writer<W>(sink: W, cancel: CancellationToken) -> (Outbound, JoinHandle<()>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(run(sink, rx, cancel));
    (tx, handle)
}

async fn run<W>(mut sink: W, mut rx: mpsc::UnboundedReceiver<String>, cancel: CancellationToken)
where
    W: AsyncWrite + Unpin,
{
    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = rx.recv() => match line {
                Some(line) => line,
                None => break,
            },
        };

        let shown = redact(line.trim_end());
        if let Err(e) = write_line(&mut sink, &line).await {
            warn!("failed to send '{}': {}", shown, e);
            continue;
        }
        debug!("<< {}", shown);
    }

    if let Err(e) = sink.shutdown().await {
        debug!("writer shutdown: {}", e);
    }
}

async fn write_line<W: AsyncWrite + Unpin>(sink: &mut W, line: &str) -> std::io::Result<()> {
    sink.write_all(line.as_bytes()).await?;
    sink.flush().await
}
