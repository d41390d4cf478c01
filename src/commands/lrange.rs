use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::SharedStore;

/// Handles the LRANGE command.
///
/// Indices are inclusive on both ends; negative indices count from the
/// tail, with `-1` naming the last element.
pub async fn lrange(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.len() != 3 {
        return Err(CommandError::WrongArgCount("lrange".to_string()));
    }

    let start = arguments[1]
        .parse::<i64>()
        .map_err(|_| CommandError::NotInteger)?;
    let end = arguments[2]
        .parse::<i64>()
        .map_err(|_| CommandError::NotInteger)?;

    let mut guard = store.write().await;
    let elements = guard.list_range(&arguments[0], start, end)?;

    Ok(RespValue::Array(
        elements.into_iter().map(RespValue::BulkString).collect(),
    )
    .encode())
}
