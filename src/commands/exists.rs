use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::SharedStore;

/// EXISTS counts the named keys that are present, once per occurrence.
pub async fn exists(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.is_empty() {
        return Err(CommandError::WrongArgCount("exists".to_string()));
    }

    let mut guard = store.write().await;
    Ok(RespValue::Integer(guard.exists(&arguments) as i64).encode())
}
