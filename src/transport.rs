//! Socket plumbing: dialing, keepalive, inbound chunks, outbound lines.

mod frame;
mod writer;

use std::io;

use tokio::net::TcpStream;
use tracing::warn;

use crate::config::Keepalive;

pub use self::frame::FrameReader;
pub(crate) use self::writer::{normalize, spawn_writer, Outbound};

/// Size of each socket read.
pub const READ_CHUNK_SIZE: usize = 1024;

/// Dial `addr` and apply keepalive settings.
pub(crate) async fn dial(addr: &str, keepalive: Option<Keepalive>) -> io::Result<TcpStream> {
    let stream = TcpStream::connect(addr).await?;
    if let Some(keepalive) = keepalive {
        if let Err(e) = enable_keepalive(&stream, keepalive) {
            warn!("failed to enable TCP keepalive: {}", e);
        }
    }
    if let Err(e) = stream.set_nodelay(true) {
        warn!("failed to set TCP_NODELAY: {}", e);
    }
    Ok(stream)
}

fn enable_keepalive(stream: &TcpStream, keepalive: Keepalive) -> io::Result<()> {
    use socket2::{SockRef, TcpKeepalive};

    let sock = SockRef::from(stream);
    let params = TcpKeepalive::new()
        .with_time(keepalive.time)
        .with_interval(keepalive.interval);
    sock.set_tcp_keepalive(&params)
}

/// Split a chunk into its CRLF-terminated lines, skipping empty ones.
pub fn split_lines(chunk: &str) -> impl Iterator<Item = &str> {
    chunk.split("\r\n").filter(|line| !line.is_empty())
}
