//! Writes newline-delimited request lines to the child's stdin.

use compositor_core::error::Result;
use tokio::io::AsyncWriteExt;
use tokio::process::ChildStdin;
use tracing::trace;

/// Writes `line` verbatim to `stdin` and flushes.
///
/// `line` is expected to already be newline-terminated (see
/// `compositor_wire::request::SerializedRequest::to_line` and
/// `compositor_wire::request::eof_line`); this function does not add one.
///
/// A write may block under OS pipe backpressure; callers are
/// expected to serialize access to a single `ChildStdin` (e.g. behind a
/// mutex) rather than interleave concurrent writes.
pub async fn write_line(stdin: &mut ChildStdin, line: &str) -> Result<()> {
    trace!(bytes = line.len(), "writing line to compositor stdin");
    stdin.write_all(line.as_bytes()).await?;
    stdin.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, duplex};

    #[tokio::test]
    async fn writes_the_line_verbatim() {
        let (mut client, mut server) = duplex(64);

        let write_task = tokio::spawn(async move {
            client.write_all(b"hello\n").await.unwrap();
            client.flush().await.unwrap();
        });

        let mut buf = vec![0u8; 6];
        server.read_exact(&mut buf).await.unwrap();
        write_task.await.unwrap();

        assert_eq!(&buf, b"hello\n");
    }
}
