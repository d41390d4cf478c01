use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::SharedStore;

/// Handles the GET command.
///
/// Returns the string value as a bulk string, the nil marker when the
/// key is absent or expired, and WRONGTYPE when the key holds a list or
/// set.
pub async fn get(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.len() != 1 {
        return Err(CommandError::WrongArgCount("get".to_string()));
    }

    let mut guard = store.write().await;
    match guard.get(&arguments[0])? {
        Some((data, _)) => Ok(RespValue::BulkString(data).encode()),
        None => Ok(RespValue::Null.encode()),
    }
}
