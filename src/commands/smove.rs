use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::SharedStore;

/// SMOVE replies `1` when the member was moved, `0` when it was not in
/// the source set.
pub async fn smove(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.len() != 3 {
        return Err(CommandError::WrongArgCount("smove".to_string()));
    }

    let mut guard = store.write().await;
    let moved = guard.smove(&arguments[0], &arguments[1], &arguments[2])?;

    Ok(RespValue::Integer(moved as i64).encode())
}
