use std::sync::Arc;

use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::snapshot::SnapshotManager;

/// SAVE writes the snapshot in the foreground. Fails while a background
/// save is running.
pub async fn save(
    snapshots: &Arc<SnapshotManager>,
    arguments: Vec<String>,
) -> Result<String, CommandError> {
    if !arguments.is_empty() {
        return Err(CommandError::WrongArgCount("save".to_string()));
    }

    snapshots
        .save()
        .await
        .map_err(|e| CommandError::Persistence(e.to_string()))?;

    Ok(RespValue::SimpleString("OK".to_string()).encode())
}

/// BGSAVE launches a detached save and replies immediately.
pub async fn bgsave(
    snapshots: &Arc<SnapshotManager>,
    arguments: Vec<String>,
) -> Result<String, CommandError> {
    if !arguments.is_empty() {
        return Err(CommandError::WrongArgCount("bgsave".to_string()));
    }

    snapshots
        .bgsave()
        .await
        .map_err(|e| CommandError::Persistence(e.to_string()))?;

    Ok(RespValue::SimpleString("OK".to_string()).encode())
}

/// LASTSAVE replies the epoch second of the last successful save.
pub async fn lastsave(
    snapshots: &Arc<SnapshotManager>,
    arguments: Vec<String>,
) -> Result<String, CommandError> {
    if !arguments.is_empty() {
        return Err(CommandError::WrongArgCount("lastsave".to_string()));
    }

    Ok(RespValue::Integer(snapshots.last_save().await).encode())
}
