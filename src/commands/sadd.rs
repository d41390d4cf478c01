use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::SharedStore;

/// SADD replies with the number of members that were newly added.
pub async fn sadd(store: &SharedStore, mut arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.len() < 2 {
        return Err(CommandError::WrongArgCount("sadd".to_string()));
    }

    let key = arguments.remove(0);
    let mut guard = store.write().await;
    let added = guard.sadd(&key, arguments)?;

    Ok(RespValue::Integer(added as i64).encode())
}
