use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::SharedStore;

/// APPEND concatenates onto the stored string, treating an absent key as
/// empty, and replies with the resulting length.
pub async fn append(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.len() != 2 {
        return Err(CommandError::WrongArgCount("append".to_string()));
    }

    let mut guard = store.write().await;
    let length = guard.append(&arguments[0], &arguments[1])?;

    Ok(RespValue::Integer(length as i64).encode())
}
