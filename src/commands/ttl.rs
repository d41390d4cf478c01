use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::SharedStore;

/// TTL replies `-2` for an unknown key, `-1` for a key without expiry and
/// otherwise the remaining whole seconds.
pub async fn ttl(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.len() != 1 {
        return Err(CommandError::WrongArgCount("ttl".to_string()));
    }

    let mut guard = store.write().await;
    Ok(RespValue::Integer(guard.ttl(&arguments[0])).encode())
}
