use crate::commands::command_error::CommandError;
use crate::replication::is_valid_repl_id;
use crate::server::ServerContext;

/// PSYNC attaches the requesting connection as a replica.
///
/// The requester names a replication id (`?` for a fresh attach) and an
/// offset. The handler returns the current snapshot file contents; the
/// connection loop streams them as a length-prefixed bulk payload and
/// registers the connection's writer in the replica set.
pub async fn psync(
    context: &ServerContext,
    arguments: Vec<String>,
) -> Result<Vec<u8>, CommandError> {
    if arguments.len() != 2 {
        return Err(CommandError::WrongArgCount("psync".to_string()));
    }
    if arguments[0] != "?" && !is_valid_repl_id(&arguments[0]) {
        return Err(CommandError::Syntax);
    }
    if arguments[1].parse::<i64>().is_err() {
        return Err(CommandError::NotInteger);
    }

    context
        .snapshots
        .file_contents()
        .await
        .map_err(|e| CommandError::Persistence(e.to_string()))
}
