//! Primary to replica streaming replication.
//!
//! Primary side: a connection that completes `PSYNC` joins the replica
//! set and immediately receives the current snapshot as a length-prefixed
//! bulk payload. From then on every applied write command is framed as a
//! RESP array and written to each attached replica in order; a replica
//! whose socket write fails is dropped from the set.
//!
//! Replica side: the node dials its primary, walks the four-step
//! handshake, loads the streamed snapshot and then applies incoming write
//! commands without ever replying on that connection.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::BytesMut;
use regex::Regex;
use thiserror::Error;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::commands::CommandHandler;
use crate::connection::{next_frame, write_to_stream, FrameReadError};
use crate::resp::{RespError, RespValue};
use crate::server::ServerContext;

#[derive(Error, Debug)]
pub enum HandshakeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("connection closed by primary")]
    ConnectionClosed,
    #[error("RESP parse error: {0}")]
    Resp(#[from] RespError),
    #[error("unexpected handshake reply from primary")]
    UnexpectedReply,
    #[error("invalid snapshot payload from primary")]
    InvalidSnapshotPayload,
}

impl From<FrameReadError> for HandshakeError {
    fn from(error: FrameReadError) -> Self {
        match error {
            FrameReadError::Io(e) => HandshakeError::Io(e),
            FrameReadError::Resp(e) => HandshakeError::Resp(e),
        }
    }
}

/// The set of replica connections attached to a primary, keyed by peer
/// address. Writers are shared with the owning connection task so the
/// accept loop can detach a replica when its socket closes.
pub struct ReplicaSet {
    inner: RwLock<HashMap<String, Arc<RwLock<OwnedWriteHalf>>>>,
}

impl Default for ReplicaSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplicaSet {
    pub fn new() -> Self {
        ReplicaSet {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Streams the snapshot as a length-prefixed bulk payload and
    /// registers the writer, holding the set's write lock throughout so no
    /// broadcast can slip in ahead of the payload.
    pub async fn attach_with_snapshot(
        &self,
        address: String,
        writer: Arc<RwLock<OwnedWriteHalf>>,
        snapshot: &[u8],
    ) -> tokio::io::Result<()> {
        let mut inner = self.inner.write().await;

        let mut payload = format!("${}\r\n", snapshot.len()).into_bytes();
        payload.extend_from_slice(snapshot);
        write_to_stream(&writer, &payload).await?;

        info!(replica = %address, bytes = snapshot.len(), "replica attached");
        inner.insert(address, writer);
        Ok(())
    }

    pub async fn detach(&self, address: &str) {
        if self.inner.write().await.remove(address).is_some() {
            info!(replica = %address, "replica detached");
        }
    }

    /// Writes one framed command to every attached replica, silently
    /// dropping replicas whose sockets fail.
    pub async fn broadcast(&self, frame: &[u8]) {
        let targets: Vec<(String, Arc<RwLock<OwnedWriteHalf>>)> = {
            let inner = self.inner.read().await;
            if inner.is_empty() {
                return;
            }
            inner
                .iter()
                .map(|(address, writer)| (address.clone(), Arc::clone(writer)))
                .collect()
        };

        let mut failed = Vec::new();
        for (address, writer) in targets {
            if let Err(e) = write_to_stream(&writer, frame).await {
                warn!(replica = %address, error = %e, "dropping replica after write failure");
                failed.push(address);
            }
        }

        if !failed.is_empty() {
            let mut inner = self.inner.write().await;
            for address in failed {
                inner.remove(&address);
            }
        }
    }
}

/// Walks the replica side of the attachment handshake and returns the
/// snapshot payload streamed by the primary.
///
/// Four round trips: `PING`, `REPLCONF listening-port <p>`,
/// `REPLCONF capa psync2`, `PSYNC ? -1`. The first three are answered
/// with `+PONG`/`+OK`; the last with `$<len>\r\n<bytes>` and no trailing
/// CRLF.
pub async fn perform_handshake(
    stream: &mut TcpStream,
    buffer: &mut BytesMut,
    listening_port: u16,
) -> Result<Vec<u8>, HandshakeError> {
    exchange(
        stream,
        buffer,
        RespValue::command_frame("PING", &[]),
        "PONG",
    )
    .await?;

    exchange(
        stream,
        buffer,
        RespValue::command_frame(
            "REPLCONF",
            &["listening-port".to_string(), listening_port.to_string()],
        ),
        "OK",
    )
    .await?;

    exchange(
        stream,
        buffer,
        RespValue::command_frame("REPLCONF", &["capa".to_string(), "psync2".to_string()]),
        "OK",
    )
    .await?;

    send_frame(
        stream,
        RespValue::command_frame("PSYNC", &["?".to_string(), "-1".to_string()]),
    )
    .await?;

    read_snapshot_payload(stream, buffer).await
}

async fn exchange(
    stream: &mut TcpStream,
    buffer: &mut BytesMut,
    request: RespValue,
    expected: &str,
) -> Result<(), HandshakeError> {
    send_frame(stream, request).await?;

    let reply = next_frame(stream, buffer)
        .await?
        .ok_or(HandshakeError::ConnectionClosed)?;
    if reply != RespValue::SimpleString(expected.to_string()) {
        return Err(HandshakeError::UnexpectedReply);
    }

    Ok(())
}

async fn send_frame(stream: &mut TcpStream, frame: RespValue) -> Result<(), HandshakeError> {
    use tokio::io::AsyncWriteExt;

    stream.write_all(frame.encode().as_bytes()).await?;
    stream.flush().await?;
    Ok(())
}

/// Reads the length-prefixed snapshot the primary streams after PSYNC:
/// a `$<len>` line followed by exactly `len` raw bytes.
async fn read_snapshot_payload(
    stream: &mut TcpStream,
    buffer: &mut BytesMut,
) -> Result<Vec<u8>, HandshakeError> {
    use tokio::io::AsyncReadExt;

    let length = loop {
        if let Some(position) = buffer.windows(2).position(|window| window == b"\r\n") {
            let line = buffer.split_to(position + 2);
            let line = std::str::from_utf8(&line[..position])
                .map_err(|_| HandshakeError::InvalidSnapshotPayload)?;
            let Some(length) = line.strip_prefix('$') else {
                return Err(HandshakeError::InvalidSnapshotPayload);
            };
            break length
                .parse::<usize>()
                .map_err(|_| HandshakeError::InvalidSnapshotPayload)?;
        }
        if stream.read_buf(buffer).await? == 0 {
            return Err(HandshakeError::ConnectionClosed);
        }
    };

    while buffer.len() < length {
        if stream.read_buf(buffer).await? == 0 {
            return Err(HandshakeError::ConnectionClosed);
        }
    }

    Ok(buffer.split_to(length).to_vec())
}

/// Applies the primary's replicated stream. Only write commands are
/// executed and nothing is ever written back on this connection.
pub async fn handle_primary_connection(
    mut stream: TcpStream,
    mut buffer: BytesMut,
    context: ServerContext,
) {
    loop {
        let frame = match next_frame(&mut stream, &mut buffer).await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                warn!("connection to primary closed");
                return;
            }
            Err(e) => {
                warn!(error = %e, "failed to read from primary");
                return;
            }
        };

        let command = match CommandHandler::from_frame(frame) {
            Ok(command) => command,
            Err(e) => {
                debug!(error = %e, "ignoring malformed frame from primary");
                continue;
            }
        };

        if !command.is_write_command() {
            debug!(command = %command.name, "ignoring non-write command from primary");
            continue;
        }

        if let Err(e) = command.execute(&context).await {
            debug!(command = %command.name, error = %e, "replicated command failed");
        }
    }
}

/// Checks the shape of a replication id: 40 alphanumeric characters.
pub fn is_valid_repl_id(repl_id: &str) -> bool {
    match Regex::new(r"^[a-zA-Z0-9]{40}$") {
        Ok(re) => re.is_match(repl_id),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_repl_id() {
        assert!(is_valid_repl_id(
            "8371b4fb1155b71f4a04d3e1bc3e18c4a990aeeb"
        ));
        assert!(!is_valid_repl_id("too-short"));
        assert!(!is_valid_repl_id(&"x".repeat(41)));
        assert!(!is_valid_repl_id(&"!".repeat(40)));
    }
}
