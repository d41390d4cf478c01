use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::SharedStore;

/// MGET looks every key up under one lock acquisition; holes are nil.
pub async fn mget(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.is_empty() {
        return Err(CommandError::WrongArgCount("mget".to_string()));
    }

    let mut guard = store.write().await;
    let values = guard.mget(&arguments);

    let elements = values
        .into_iter()
        .map(|value| match value {
            Some(data) => RespValue::BulkString(data),
            None => RespValue::Null,
        })
        .collect();

    Ok(RespValue::Array(elements).encode())
}
