use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::SharedStore;

/// SMEMBERS replies with every member, in unspecified order.
pub async fn smembers(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.len() != 1 {
        return Err(CommandError::WrongArgCount("smembers".to_string()));
    }

    let mut guard = store.write().await;
    let members = guard.smembers(&arguments[0])?;

    Ok(RespValue::Array(
        members.into_iter().map(RespValue::BulkString).collect(),
    )
    .encode())
}
