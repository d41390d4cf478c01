//! Per-connection handling.
//!
//! Each accepted socket gets its own task running [`handle_client_connection`].
//! Frames are accumulated into a buffer and peeled off one at a time, so
//! pipelined commands and partial reads both work. Argument and type
//! errors are reported and the connection continues; a RESP decode
//! failure is fatal to the connection only.

use std::sync::Arc;

use bytes::BytesMut;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::commands::{CommandError, CommandHandler, CommandOutcome};
use crate::resp::{self, RespError, RespValue};
use crate::server::ServerContext;

#[derive(Error, Debug)]
pub enum FrameReadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RESP parse error: {0}")]
    Resp(#[from] RespError),
}

/// Reads until one complete frame is available. `Ok(None)` means the
/// peer closed the connection.
pub async fn next_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
    buffer: &mut BytesMut,
) -> Result<Option<RespValue>, FrameReadError> {
    loop {
        if let Some(frame) = resp::parse_frame(buffer)? {
            return Ok(Some(frame));
        }
        if reader.read_buf(buffer).await? == 0 {
            return Ok(None);
        }
    }
}

/// Writes a full reply and flushes it, serializing against other writers
/// of the same socket.
pub async fn write_to_stream(
    writer: &Arc<RwLock<OwnedWriteHalf>>,
    bytes: &[u8],
) -> tokio::io::Result<()> {
    let mut guard = writer.write().await;
    guard.write_all(bytes).await?;
    guard.flush().await?;
    Ok(())
}

/// Serves one client until it disconnects.
pub async fn handle_client_connection(
    stream: TcpStream,
    client_address: String,
    context: ServerContext,
) {
    let (mut reader, writer) = stream.into_split();
    let writer = Arc::new(RwLock::new(writer));
    let mut buffer = BytesMut::with_capacity(4096);

    loop {
        let frame = match next_frame(&mut reader, &mut buffer).await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                context.replicas.detach(&client_address).await;
                debug!(client = %client_address, "client disconnected");
                return;
            }
            Err(e) => {
                let message = RespValue::Error(format!("ERR {}", e)).encode();
                let _ = write_to_stream(&writer, message.as_bytes()).await;
                warn!(client = %client_address, error = %e, "closing connection after decode failure");
                context.replicas.detach(&client_address).await;
                return;
            }
        };

        let command = match CommandHandler::from_frame(frame) {
            Ok(command) => command,
            Err(e) => {
                if write_reply(&writer, &e.as_resp()).await.is_err() {
                    return;
                }
                continue;
            }
        };

        if context.config.role.is_replica() && !command.is_read_only_command() {
            let reply = CommandError::ReadOnly.as_resp();
            if write_reply(&writer, &reply).await.is_err() {
                return;
            }
            continue;
        }

        match command.execute(&context).await {
            Ok(CommandOutcome::Reply(reply)) => {
                if write_reply(&writer, &reply).await.is_err() {
                    return;
                }
                if command.is_write_command() && !context.config.role.is_replica() {
                    let frame = command.replication_frame();
                    context.replicas.broadcast(frame.as_bytes()).await;
                }
            }
            Ok(CommandOutcome::AttachReplica(snapshot)) => {
                if context
                    .replicas
                    .attach_with_snapshot(client_address.clone(), Arc::clone(&writer), &snapshot)
                    .await
                    .is_err()
                {
                    return;
                }
            }
            Err(e) => {
                if write_reply(&writer, &e.as_resp()).await.is_err() {
                    return;
                }
            }
        }
    }
}

async fn write_reply(writer: &Arc<RwLock<OwnedWriteHalf>>, reply: &str) -> tokio::io::Result<()> {
    if let Err(e) = write_to_stream(writer, reply.as_bytes()).await {
        warn!(error = %e, "failed to write reply");
        return Err(e);
    }
    Ok(())
}
