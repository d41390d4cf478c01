use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::{glob_to_regex, SharedStore};

/// KEYS scans the whole keyspace against a glob pattern. A pattern that
/// does not translate to a valid matcher selects nothing.
pub async fn keys(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.len() != 1 {
        return Err(CommandError::WrongArgCount("keys".to_string()));
    }

    let Some(pattern) = glob_to_regex(&arguments[0]) else {
        return Ok(RespValue::Array(Vec::new()).encode());
    };

    let mut guard = store.write().await;
    let matched = guard.keys_matching(&pattern);

    Ok(RespValue::Array(
        matched.into_iter().map(RespValue::BulkString).collect(),
    )
    .encode())
}
